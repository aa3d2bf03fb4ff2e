//! Cancellable delayed task used for auto-advance.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns a task that runs `action` after a delay.
///
/// Dropping or cancelling the handle aborts the task. If the delay has not
/// elapsed yet, the action never runs.
pub(crate) struct AdvanceHandle {
    handle: JoinHandle<()>,
}

impl AdvanceHandle {
    pub(crate) fn spawn<F>(delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        Self { handle }
    }

    /// Whether the task is still waiting or running.
    pub(crate) fn is_pending(&self) -> bool {
        !self.handle.is_finished()
    }

    pub(crate) fn cancel(self) {
        drop(self);
    }
}

impl Drop for AdvanceHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
