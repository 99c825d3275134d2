// SPDX-License-Identifier: MIT OR Apache-2.0
//! The supervised process's final result.

use crate::stream::CapturedStream;

/// Everything a supervised process left behind: exit code and both sealed
/// output streams.
///
/// Produced exactly once per supervised process, only after both streams
/// sealed and the exit was observed. `exit_code` is `None` when the platform
/// reported signal termination — the usual outcome of a cancellation kill —
/// and is advisory only in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// OS-reported exit code; `None` on signal termination.
    pub exit_code: Option<i32>,
    /// Sealed stdout capture.
    pub stdout: CapturedStream,
    /// Sealed stderr capture.
    pub stderr: CapturedStream,
}

impl ProcessResult {
    /// Whether the process exited naturally with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
