// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cooperative cancellation token for supervised processes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    flagged: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation token for a supervised process.
///
/// Cloneable and backed by an `Arc`; calling [`cancel`](CancelToken::cancel)
/// on any clone signals all waiters. A default token never fires, so callers
/// that do not need cancellation can pass `CancelToken::new()` and forget it.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to all waiters. Idempotent.
    pub fn cancel(&self) {
        self.inner.flagged.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` if cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.flagged.load(Ordering::SeqCst)
    }

    /// Wait until cancellation is signalled (returns immediately if already
    /// cancelled).
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before the second flag check so a cancel landing between
        // the check and the await is not missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
