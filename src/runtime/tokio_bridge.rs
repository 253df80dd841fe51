//! Async entry points for callers running inside a tokio runtime.
//!
//! `add_task` and `wait` block their thread; these wrappers move the blocking
//! part onto tokio's blocking pool so the async executor keeps making progress.

use std::sync::Arc;

use crate::core::{AppResult, Scheduler, SchedulerError, TaskId};

impl Scheduler {
    /// Async counterpart of [`Scheduler::wait`].
    pub async fn wait_async(&self) {
        let shared = Arc::clone(&self.shared);
        let dispatcher = self.take_dispatcher();
        // A join error means the blocking pool is shutting down; there is
        // nobody left to report to.
        let _ = tokio::task::spawn_blocking(move || {
            shared.completion.wait();
            if let Some(handle) = dispatcher {
                let _ = handle.join();
            }
        })
        .await;
    }

    /// Async counterpart of [`Scheduler::add_task`].
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Closed` if closure was requested
    /// - `SchedulerError::Spawn` if the blocking pool rejected the submission
    pub async fn add_task_async<F>(&self, task: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.add_task(task))
            .await
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?
    }
}
