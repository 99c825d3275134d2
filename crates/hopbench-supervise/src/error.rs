// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for process supervision.

use thiserror::Error;

/// Errors from supervising a process.
///
/// A non-zero exit code is deliberately NOT an error here: the supervisor
/// reports the code verbatim and the caller decides what counts as failure.
#[derive(Debug, Error)]
pub enum SuperviseError {
    /// The OS process could not be created. Fatal to the invocation; no
    /// stream reading is attempted and nothing is retried.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        /// The executable that failed to launch.
        command: String,
        /// The platform-reported cause.
        #[source]
        source: std::io::Error,
    },

    /// A captured pipe was unexpectedly absent after spawn.
    #[error("{0} pipe unavailable after spawn")]
    Stdio(&'static str),

    /// Waiting for process exit failed.
    #[error("failed to await process exit: {0}")]
    Wait(#[source] std::io::Error),
}
