//! Task execution strategies.

use std::time::Instant;

use tracing::{debug, info_span};

use super::{AppResult, Task, TaskMeta};

/// Strategy that runs a task and reports its outcome.
///
/// The scheduler calls `execute` from a dedicated thread per task, so an
/// implementation may block for as long as the task needs. It must not keep
/// any reference to the task after returning.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_task_scheduler::core::{AppResult, Executor, Task, TaskMeta};
///
/// struct AuditedExecutor;
///
/// impl Executor for AuditedExecutor {
///     fn execute(&self, task: Task, meta: &TaskMeta) -> AppResult<()> {
///         println!("running task {}", meta.id);
///         task()
///     }
/// }
/// ```
pub trait Executor: Send + Sync + 'static {
    /// Run `task` and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns whatever error the task itself produced.
    fn execute(&self, task: Task, meta: &TaskMeta) -> AppResult<()>;
}

/// Default strategy: invokes the task synchronously on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleExecutor;

impl SimpleExecutor {
    /// Create a new simple executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Executor for SimpleExecutor {
    fn execute(&self, task: Task, _meta: &TaskMeta) -> AppResult<()> {
        task()
    }
}

/// Wraps another executor, running each task inside a tracing span and
/// recording how long it took.
#[derive(Debug, Clone, Default)]
pub struct TracedExecutor<E> {
    inner: E,
}

impl<E: Executor> TracedExecutor<E> {
    /// Wrap `inner`.
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Executor> Executor for TracedExecutor<E> {
    fn execute(&self, task: Task, meta: &TaskMeta) -> AppResult<()> {
        let span = info_span!("task", task_id = meta.id);
        let _entered = span.enter();

        let queued_for = meta.submitted_at.elapsed();
        let start = Instant::now();
        let outcome = self.inner.execute(task, meta);

        debug!(
            task_id = meta.id,
            queued_ms = queued_for.as_millis(),
            elapsed_ms = start.elapsed().as_millis(),
            ok = outcome.is_ok(),
            "task finished"
        );
        outcome
    }
}

impl<F> Executor for F
where
    F: Fn(Task, &TaskMeta) -> AppResult<()> + Send + Sync + 'static,
{
    fn execute(&self, task: Task, meta: &TaskMeta) -> AppResult<()> {
        self(task, meta)
    }
}
