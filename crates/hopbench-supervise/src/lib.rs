// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hopbench-supervise
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Child-process supervision for the hopbench harness. The supervisor owns
//! one process's lifecycle end to end: start, line-by-line stream capture,
//! exit detection, cancellation-triggered kill, and result assembly.

pub mod cancel;
pub mod complete;
pub mod error;
pub mod result;
pub mod spec;
pub mod stream;
pub mod supervisor;

pub use cancel::CancelToken;
pub use complete::Completion;
pub use error::SuperviseError;
pub use result::ProcessResult;
pub use spec::ProcessSpec;
pub use stream::CapturedStream;
pub use supervisor::{LineHook, LineHooks, supervise};
