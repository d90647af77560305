//! One-shot close flag shared by connection implementations.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Latching close flag that async readers can wait on.
#[derive(Debug, Default)]
pub(crate) struct CloseSignal {
    closed: AtomicBool,
    notify: Notify,
}

impl CloseSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Latch the flag and wake every waiter. Returns false if already closed.
    pub(crate) fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolve once the flag is latched.
    pub(crate) async fn closed(&self) {
        loop {
            // Register before checking so a concurrent close is not missed
            let notified = self.notify.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }
}
