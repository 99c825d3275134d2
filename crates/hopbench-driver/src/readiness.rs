// SPDX-License-Identifier: MIT OR Apache-2.0
//! Server readiness detection.
//!
//! Readiness is a driver policy, not a supervisor concern: the driver scans
//! the supervised server's stdout for a known marker substring, then
//! confirms with an HTTP polling loop before any timing starts.

use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

use hopbench_supervise::LineHook;

use crate::error::DriverError;

/// Scans supervised stdout lines for a readiness marker.
///
/// [`hooked`](ReadinessGate::hooked) returns the gate together with a
/// [`LineHook`] to pass as the supervisor's `on_stdout`; the hook forwards
/// every line into the gate's channel.
pub struct ReadinessGate {
    rx: mpsc::UnboundedReceiver<String>,
    marker: String,
}

impl ReadinessGate {
    /// Build a gate for `marker` plus the stdout hook that feeds it.
    pub fn hooked(marker: impl Into<String>) -> (LineHook, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hook: LineHook = Box::new(move |line: &str| {
            let _ = tx.send(line.to_string());
        });
        (
            hook,
            Self {
                rx,
                marker: marker.into(),
            },
        )
    }

    /// Wait until a line containing the marker arrives.
    ///
    /// Fails with [`DriverError::ReadinessTimeout`] after `deadline`, or
    /// immediately once the line source closes without the marker (the
    /// server exited before announcing readiness).
    pub async fn wait_for_marker(&mut self, deadline: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        loop {
            let remaining = deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(DriverError::ReadinessTimeout { waited: deadline });
            }
            match tokio::time::timeout(remaining, self.rx.recv()).await {
                Ok(Some(line)) => {
                    if line.contains(&self.marker) {
                        debug!(target: "hopbench.driver", %line, "readiness marker seen");
                        return Ok(());
                    }
                }
                Ok(None) => {
                    return Err(DriverError::ReadinessTimeout {
                        waited: started.elapsed(),
                    });
                }
                Err(_) => {
                    return Err(DriverError::ReadinessTimeout { waited: deadline });
                }
            }
        }
    }
}

/// Poll `url` with GETs until it answers a success status.
///
/// Sleeps `delay` between attempts; gives up after `deadline`.
pub async fn poll_http_ready(
    client: &reqwest::Client,
    url: &str,
    delay: Duration,
    deadline: Duration,
) -> Result<(), DriverError> {
    let started = Instant::now();
    loop {
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(target: "hopbench.driver", %url, waited = ?started.elapsed(), "endpoint ready");
                return Ok(());
            }
            Ok(resp) => {
                debug!(target: "hopbench.driver", %url, status = %resp.status(), "not ready yet");
            }
            Err(err) => {
                debug!(target: "hopbench.driver", %url, error = %err, "not reachable yet");
            }
        }
        if started.elapsed() >= deadline {
            return Err(DriverError::ReadinessTimeout {
                waited: started.elapsed(),
            });
        }
        tokio::time::sleep(delay).await;
    }
}
