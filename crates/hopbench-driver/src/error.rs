// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the benchmark driver.

use std::time::Duration;
use thiserror::Error;

/// Errors from readiness polling, request batches, and report output.
#[derive(Debug, Error)]
pub enum DriverError {
    /// An HTTP request failed at the transport level.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A benchmarked endpoint answered with a non-success status.
    #[error("{url} answered {status}")]
    BadStatus {
        /// The requested URL.
        url: String,
        /// The returned status code.
        status: reqwest::StatusCode,
    },

    /// A response body could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server did not become ready within the deadline.
    #[error("server not ready after {waited:?}")]
    ReadinessTimeout {
        /// How long the driver waited before giving up.
        waited: Duration,
    },

    /// Writing the results file failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
