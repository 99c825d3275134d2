// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hopbench_driver::{
    BenchConfig, BenchReport, ReadinessGate, abnormal_exit_diagnostic, poll_http_ready,
    run_benchmark, write_report,
};
use hopbench_supervise::{CancelToken, LineHooks, ProcessSpec, supervise};

/// Stdout marker the demo server prints once it is accepting connections.
const READY_MARKER: &str = "listening on";

#[derive(Parser, Debug)]
#[command(
    name = "hopbench",
    version,
    about = "HTTP latency benchmark: direct endpoint vs. one-hop relay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Spawn the demo server, benchmark both endpoints, write the report.
    Run {
        /// Path to the server binary (defaults to the `hopbench-server`
        /// sibling of this executable).
        #[arg(long)]
        server_bin: Option<PathBuf>,

        /// Address the server should bind.
        #[arg(long, default_value = "127.0.0.1:8787")]
        bind: String,

        /// Untimed warmup requests per endpoint.
        #[arg(long, default_value_t = 20)]
        warmup: usize,

        /// Timed requests per endpoint.
        #[arg(long, default_value_t = 200)]
        requests: usize,

        /// Where to write the JSON report.
        #[arg(long, default_value = "hopbench-results.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("hopbench=debug")
    } else {
        EnvFilter::new("hopbench=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            server_bin,
            bind,
            warmup,
            requests,
            out,
        } => cmd_run(server_bin, bind, warmup, requests, out).await,
    }
}

fn default_server_bin() -> Result<PathBuf> {
    let me = std::env::current_exe().context("resolve current executable")?;
    let dir = me
        .parent()
        .context("current executable has no parent directory")?;
    Ok(dir.join("hopbench-server"))
}

async fn cmd_run(
    server_bin: Option<PathBuf>,
    bind: String,
    warmup: usize,
    requests: usize,
    out: PathBuf,
) -> Result<()> {
    let server_bin = match server_bin {
        Some(path) => path,
        None => default_server_bin()?,
    };
    let command = server_bin.display().to_string();

    let mut spec = ProcessSpec::new(&command);
    spec.args = vec!["--bind".to_string(), bind.clone()];

    let (hook, mut gate) = ReadinessGate::hooked(READY_MARKER);
    let hooks = LineHooks {
        on_stdout: Some(hook),
        on_stderr: None,
    };

    let cancel = CancelToken::new();
    let mut server = tokio::spawn(supervise(spec, hooks, cancel.clone()));
    info!(target: "hopbench", %command, %bind, "server spawned");

    // A server that dies before announcing readiness should fail loudly
    // with its captured output, not as a bare timeout.
    tokio::select! {
        joined = &mut server => {
            let result = joined.context("supervisor task")??;
            bail!(abnormal_exit_diagnostic(&command, &result));
        }
        ready = gate.wait_for_marker(Duration::from_secs(15)) => {
            ready.context("waiting for server readiness")?;
        }
    }

    let base_url = format!("http://{bind}");
    let client = reqwest::Client::new();
    let outcome = drive(&client, &base_url, warmup, requests, &out).await;

    cancel.cancel();
    let result = server.await.context("supervisor task")??;

    match outcome {
        Ok(report) => {
            print_summary(&report);
            // Exit code after a requested cancel is advisory only.
            info!(target: "hopbench", code = ?result.exit_code, "server stopped");
            Ok(())
        }
        Err(err) => {
            if result.exit_code.is_some_and(|code| code != 0) {
                bail!("{err:#}\n{}", abnormal_exit_diagnostic(&command, &result));
            }
            Err(err)
        }
    }
}

async fn drive(
    client: &reqwest::Client,
    base_url: &str,
    warmup: usize,
    requests: usize,
    out: &Path,
) -> Result<BenchReport> {
    poll_http_ready(
        client,
        &format!("{base_url}/hello"),
        Duration::from_millis(100),
        Duration::from_secs(15),
    )
    .await
    .context("polling server readiness")?;

    let config = BenchConfig {
        base_url: base_url.to_string(),
        warmup,
        requests,
    };
    let report = run_benchmark(client, &config)
        .await
        .context("running benchmark batches")?;

    write_report(out, &report)
        .await
        .with_context(|| format!("writing report to {}", out.display()))?;

    Ok(report)
}

fn print_summary(report: &BenchReport) {
    info!(
        target: "hopbench",
        "direct /hello: mean {:.3} ms, min {:.3} ms, max {:.3} ms over {} requests",
        report.direct.mean_ms, report.direct.min_ms, report.direct.max_ms, report.requests
    );
    info!(
        target: "hopbench",
        "relayed /relay: mean {:.3} ms, min {:.3} ms, max {:.3} ms over {} requests",
        report.relay.mean_ms, report.relay.min_ms, report.relay.max_ms, report.requests
    );
    info!(
        target: "hopbench",
        "nested hop: mean {:.3} ms ({:.1}% of relayed total)",
        report.nested.mean_ms, report.nested_share_pct
    );
}
