// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hopbench-driver
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod readiness;
pub mod report;
pub mod run;
pub mod stats;

pub use error::DriverError;
pub use readiness::{ReadinessGate, poll_http_ready};
pub use report::{BenchReport, write_report};
pub use run::{BenchConfig, abnormal_exit_diagnostic, run_benchmark};
pub use stats::LatencyStats;
