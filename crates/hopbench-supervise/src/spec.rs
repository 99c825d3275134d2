// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process specification types.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for a supervised process (command, args, env, cwd).
///
/// Read-only once handed to [`supervise`](crate::supervise); the supervisor
/// takes it by value and never mutates it.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Executable to run.
    pub command: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Environment overrides, merged onto the inherited environment.
    /// An override wins on key collision.
    pub env: BTreeMap<String, String>,
    /// Optional working directory override.
    pub cwd: Option<PathBuf>,
}

impl ProcessSpec {
    /// Create a spec with the given command and default (empty) args/env.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }
}
