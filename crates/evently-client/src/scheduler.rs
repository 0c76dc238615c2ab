//! A single cancellable one-shot task.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Pending {
    id: u64,
    handle: JoinHandle<()>,
}

/// Owns at most one pending delayed task.
///
/// Scheduling replaces (and aborts) whatever was pending. Dropping the
/// scheduler aborts the pending task.
#[derive(Default)]
pub(crate) struct RefreshScheduler {
    pending: Mutex<Option<Pending>>,
    next_id: AtomicU64,
}

impl RefreshScheduler {
    /// Run `make(id)` after `delay`, replacing any pending task.
    ///
    /// The task should call [`RefreshScheduler::claim`] with its id when it
    /// wakes; a zero delay runs it on the next tick. Must be called from
    /// within a Tokio runtime.
    pub(crate) fn schedule<F, Fut>(&self, delay: Duration, make: F)
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = make(id);
        // The countdown starts now, not when the task is first polled.
        let deadline = Instant::now() + delay;

        // Hold the slot while spawning so the task cannot claim before it is registered.
        let mut pending = self.pending.lock().unwrap();
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep_until(deadline).await;
            }
            task.await;
        });

        if let Some(previous) = pending.replace(Pending { id, handle }) {
            previous.handle.abort();
        }
    }

    /// Called by a woken task. Returns false if it was superseded.
    pub(crate) fn claim(&self, id: u64) -> bool {
        let mut pending = self.pending.lock().unwrap();
        if pending.as_ref().is_some_and(|p| p.id == id) {
            pending.take();
            true
        } else {
            false
        }
    }

    /// Abort the pending task, if any.
    pub(crate) fn cancel(&self) {
        if let Some(previous) = self.pending.lock().unwrap().take() {
            previous.handle.abort();
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.lock().unwrap().is_some()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut()
            && let Some(previous) = pending.take()
        {
            previous.handle.abort();
        }
    }
}
