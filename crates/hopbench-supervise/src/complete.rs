// SPDX-License-Identifier: MIT OR Apache-2.0
//! Completion coordination: a three-party rendezvous with a single result
//! slot.
//!
//! Three independent signals converge here — stdout sealed, stderr sealed,
//! process exited — in any interleaving, possibly from different tasks.
//! Whichever arrives last triggers assembly of the one [`ProcessResult`];
//! once produced the coordinator is terminal and ignores further offers.

use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::result::ProcessResult;
use crate::stream::CapturedStream;

#[derive(Default)]
struct Slots {
    stdout: Option<CapturedStream>,
    stderr: Option<CapturedStream>,
    exit_code: Option<Option<i32>>,
    result: Option<ProcessResult>,
    produced: bool,
}

impl Slots {
    fn try_assemble(&mut self) -> bool {
        if self.produced
            || self.stdout.is_none()
            || self.stderr.is_none()
            || self.exit_code.is_none()
        {
            return false;
        }
        self.produced = true;
        self.result = Some(ProcessResult {
            exit_code: self.exit_code.take().unwrap_or(None),
            stdout: self.stdout.take().unwrap_or_default(),
            stderr: self.stderr.take().unwrap_or_default(),
        });
        true
    }
}

/// Joins the three completion signals of one supervised process into a
/// single result, first-write-wins per slot.
///
/// Cloneable; all clones share the same slots. Safe under concurrent offers
/// from different tasks: the mutex serialises slot writes and the `produced`
/// flag guarantees at most one assembly.
#[derive(Clone, Default)]
pub struct Completion {
    slots: Arc<Mutex<Slots>>,
    notify: Arc<Notify>,
}

impl Completion {
    /// Create a coordinator with all three slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the sealed stdout capture. Returns `false` if the slot was
    /// already filled or the coordinator is terminal.
    pub fn offer_stdout(&self, stream: CapturedStream) -> bool {
        let mut slots = self.slots.lock().expect("completion lock poisoned");
        if slots.produced || slots.stdout.is_some() {
            return false;
        }
        slots.stdout = Some(stream);
        if slots.try_assemble() {
            self.notify.notify_one();
        }
        true
    }

    /// Offer the sealed stderr capture. Returns `false` if the slot was
    /// already filled or the coordinator is terminal.
    pub fn offer_stderr(&self, stream: CapturedStream) -> bool {
        let mut slots = self.slots.lock().expect("completion lock poisoned");
        if slots.produced || slots.stderr.is_some() {
            return false;
        }
        slots.stderr = Some(stream);
        if slots.try_assemble() {
            self.notify.notify_one();
        }
        true
    }

    /// Offer the observed exit code (`None` = signal termination). Returns
    /// `false` if the slot was already filled or the coordinator is
    /// terminal.
    pub fn offer_exit(&self, exit_code: Option<i32>) -> bool {
        let mut slots = self.slots.lock().expect("completion lock poisoned");
        if slots.produced || slots.exit_code.is_some() {
            return false;
        }
        slots.exit_code = Some(exit_code);
        if slots.try_assemble() {
            self.notify.notify_one();
        }
        true
    }

    /// Take the assembled result if all three signals have arrived. Yields
    /// `Some` exactly once.
    pub fn try_take(&self) -> Option<ProcessResult> {
        let mut slots = self.slots.lock().expect("completion lock poisoned");
        slots.result.take()
    }

    /// Wait until the result is produced, then take it.
    ///
    /// Intended for a single consumer; concurrent waiters race for the one
    /// result and the losers wait forever.
    pub async fn wait(&self) -> ProcessResult {
        loop {
            if let Some(result) = self.try_take() {
                return result;
            }
            self.notify.notified().await;
        }
    }
}
