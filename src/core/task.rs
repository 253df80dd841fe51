//! Task unit and the metadata that travels with it.

use std::fmt;
use std::time::Instant;

use super::AppResult;

/// Identifier assigned to each accepted submission, in submission order.
pub type TaskId = u64;

/// A zero-argument unit of work returning success or failure.
pub type Task = Box<dyn FnOnce() -> AppResult<()> + Send + 'static>;

/// Metadata handed to the executor alongside the task.
#[derive(Debug, Clone, Copy)]
pub struct TaskMeta {
    /// Unique task identifier.
    pub id: TaskId,
    /// When the task was accepted into the queue.
    pub submitted_at: Instant,
}

/// A task sitting in the queue.
pub(crate) struct QueuedTask {
    pub meta: TaskMeta,
    pub task: Task,
}

impl QueuedTask {
    pub(crate) fn new<F>(id: TaskId, task: F) -> Self
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        Self {
            meta: TaskMeta {
                id,
                submitted_at: Instant::now(),
            },
            task: Box::new(task),
        }
    }
}

impl fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTask").field("meta", &self.meta).finish_non_exhaustive()
    }
}
