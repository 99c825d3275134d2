// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timed request batches against the direct and relay endpoints.

use chrono::Utc;
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::info;

use hopbench_supervise::ProcessResult;

use crate::error::DriverError;
use crate::report::BenchReport;
use crate::stats::LatencyStats;

/// Batch sizes and target for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Server base URL, e.g. `http://127.0.0.1:8787`.
    pub base_url: String,
    /// Untimed warmup requests per endpoint.
    pub warmup: usize,
    /// Timed requests per endpoint.
    pub requests: usize,
}

/// Body of the relay endpoint's response.
#[derive(Debug, Deserialize)]
struct RelayBody {
    nested_ms: f64,
}

async fn timed_get(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Duration, String), DriverError> {
    let started = Instant::now();
    let resp = client.get(url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    let elapsed = started.elapsed();
    if !status.is_success() {
        return Err(DriverError::BadStatus {
            url: url.to_string(),
            status,
        });
    }
    Ok((elapsed, body))
}

/// Run warmup plus timed batches against `/hello` and `/relay` and reduce
/// the samples into a [`BenchReport`].
pub async fn run_benchmark(
    client: &reqwest::Client,
    config: &BenchConfig,
) -> Result<BenchReport, DriverError> {
    let hello_url = format!("{}/hello", config.base_url);
    let relay_url = format!("{}/relay", config.base_url);

    for url in [&hello_url, &relay_url] {
        for _ in 0..config.warmup {
            let _ = timed_get(client, url).await?;
        }
    }

    let mut direct = Vec::with_capacity(config.requests);
    for _ in 0..config.requests {
        let (elapsed, _) = timed_get(client, &hello_url).await?;
        direct.push(elapsed);
    }
    info!(target: "hopbench.driver", samples = direct.len(), "direct batch done");

    let mut relay = Vec::with_capacity(config.requests);
    let mut nested = Vec::with_capacity(config.requests);
    for _ in 0..config.requests {
        let (elapsed, body) = timed_get(client, &relay_url).await?;
        let parsed: RelayBody = serde_json::from_str(&body)?;
        relay.push(elapsed);
        nested.push(Duration::from_secs_f64(parsed.nested_ms / 1_000.0));
    }
    info!(target: "hopbench.driver", samples = relay.len(), "relay batch done");

    let relay_stats = LatencyStats::from_samples(&relay);
    let nested_stats = LatencyStats::from_samples(&nested);
    let nested_share_pct = if relay_stats.mean_ms > 0.0 {
        nested_stats.mean_ms / relay_stats.mean_ms * 100.0
    } else {
        0.0
    };

    Ok(BenchReport {
        generated_at: Utc::now(),
        base_url: config.base_url.clone(),
        warmup: config.warmup,
        requests: config.requests,
        direct: LatencyStats::from_samples(&direct),
        relay: relay_stats,
        nested: nested_stats,
        nested_share_pct,
    })
}

/// Format a postmortem for a server that died with a non-zero exit.
///
/// Non-zero exit is caller policy, not a supervisor error; this is the
/// caller side of that bargain: exit code plus the full captured output.
pub fn abnormal_exit_diagnostic(command: &str, result: &ProcessResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "`{command}` exited abnormally (code: {})",
        match result.exit_code {
            Some(code) => code.to_string(),
            None => "killed by signal".to_string(),
        }
    );
    let _ = writeln!(out, "--- stdout ({} lines) ---", result.stdout.len());
    for line in result.stdout.lines() {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "--- stderr ({} lines) ---", result.stderr.len());
    for line in result.stderr.lines() {
        let _ = writeln!(out, "{line}");
    }
    out
}
