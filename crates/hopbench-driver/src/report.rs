// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmark report assembly and persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::DriverError;
use crate::stats::LatencyStats;

/// The structured summary a benchmark run leaves behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Base URL of the benchmarked server.
    pub base_url: String,
    /// Warmup requests per endpoint (not timed).
    pub warmup: usize,
    /// Timed requests per endpoint.
    pub requests: usize,
    /// Latency of the direct hello endpoint.
    pub direct: LatencyStats,
    /// End-to-end latency of the relay endpoint.
    pub relay: LatencyStats,
    /// Latency of the nested outbound call, as reported by the server.
    pub nested: LatencyStats,
    /// Mean nested latency as a percentage of mean relay latency.
    pub nested_share_pct: f64,
}

/// Persist the report as pretty-printed JSON.
pub async fn write_report(path: &Path, report: &BenchReport) -> Result<(), DriverError> {
    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes).await?;
    info!(target: "hopbench.driver", path = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BenchReport {
        BenchReport {
            generated_at: Utc::now(),
            base_url: "http://127.0.0.1:8787".to_string(),
            warmup: 10,
            requests: 100,
            direct: LatencyStats {
                count: 100,
                mean_ms: 1.2,
                min_ms: 0.8,
                max_ms: 4.1,
            },
            relay: LatencyStats {
                count: 100,
                mean_ms: 2.9,
                min_ms: 1.9,
                max_ms: 7.3,
            },
            nested: LatencyStats {
                count: 100,
                mean_ms: 1.4,
                min_ms: 0.9,
                max_ms: 4.4,
            },
            nested_share_pct: 48.27,
        }
    }

    #[test]
    fn serde_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: BenchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }

    #[tokio::test]
    async fn write_report_produces_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let report = sample_report();

        write_report(&path, &report).await.unwrap();

        let raw = tokio::fs::read(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed["requests"], 100);
        assert_eq!(parsed["direct"]["count"], 100);
        assert!(parsed["nested_share_pct"].as_f64().unwrap() > 0.0);
    }
}
