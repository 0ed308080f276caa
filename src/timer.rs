//! Delayed-callback utility.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A cancellable one-shot delayed callback.
///
/// The callback fires at most once. Cancelling is idempotent and a no-op
/// once the callback has run; dropping the handle cancels a pending
/// callback, so a `Deferred` owned by another object dies with its owner.
pub struct Deferred {
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Deferred {
    /// Schedules `f` to run on the current tokio runtime after `delay`.
    pub fn run_after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let done = Arc::new(AtomicBool::new(false));
        let task_done = Arc::clone(&done);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Whoever flips the flag first decides: fire or stay cancelled.
            if task_done
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                f();
            }
        });

        Self { done, handle }
    }

    /// Cancels the pending callback. Returns whether this call cancelled it.
    pub fn cancel(&self) -> bool {
        if self
            .done
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.handle.abort();
            true
        } else {
            false
        }
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        self.cancel();
    }
}
