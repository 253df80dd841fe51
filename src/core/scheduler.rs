//! Bounded-concurrency scheduler.
//!
//! Callers push closures into a bounded FIFO queue with [`Scheduler::add_task`].
//! A dispatch loop, running on its own thread, repeatedly races two things:
//!
//! - acquiring a concurrency slot and then dequeuing a task, and
//! - the cancellation signal (explicit [`Scheduler::cancel`] or the configured
//!   timeout).
//!
//! Each dequeued task runs on its own OS thread and holds its slot until it
//! finishes, so at most `concurrency` tasks run at once. A full queue blocks
//! submitters, which is the scheduler's only backpressure.
//!
//! The loop ends in one of two ways:
//!
//! - **Drained**: [`Scheduler::finish`] was called and every queued task ran.
//!   No terminal error is recorded.
//! - **Interrupted**: cancellation or the deadline fired first. Submissions are
//!   closed, every task still queued is discarded and counted as unexecuted,
//!   and the cause is kept as the terminal error.
//!
//! Either way the loop waits for in-flight executions before firing the
//! completion signal that [`Scheduler::wait`] blocks on.
//!
//! # Example
//!
//! ```rust,ignore
//! use prometheus_task_scheduler::core::Scheduler;
//! use std::time::Duration;
//!
//! let scheduler = Scheduler::builder()
//!     .with_concurrency(5)
//!     .with_queue_size(1)
//!     .with_timeout(Duration::from_secs(5))
//!     .build()?;
//! scheduler.start()?;
//!
//! for _ in 0..20 {
//!     scheduler.add_task(|| {
//!         std::thread::sleep(Duration::from_secs(1));
//!         Ok(())
//!     })?;
//! }
//! scheduler.finish();
//! scheduler.wait();
//!
//! println!("{} ran, {} dropped: {}", scheduler.executed_count(),
//!     scheduler.unexecuted_count(), scheduler.error());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, select_biased, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex, RwLock};
use uuid::Uuid;

use crate::builders::SchedulerBuilder;
use crate::config::SchedulerConfig;
use crate::core::cancel::CancelSignal;
use crate::core::recovery::contain;
use crate::core::semaphore::{Permit, Semaphore};
use crate::core::task::QueuedTask;
use crate::core::{
    AppResult, Executor, FaultOrigin, LogRecovery, Logger, RecoveryHook, SchedulerError,
    SchedulerStats, SimpleExecutor, TaskId, TerminalError, TracingLogger,
};

use super::stats::SchedulerCounters;

/// Lifecycle of a scheduler. `Terminated` is final; there is no restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Built, dispatch loop not started.
    Idle,
    /// Dispatch loop active.
    Running,
    /// Dispatch loop exited and the completion signal fired.
    Terminated,
}

/// How the dispatch loop ended.
enum Exit {
    Drained,
    Interrupted(TerminalError),
}

/// Submission side of the queue. Dropping both senders is the one-way
/// transition to "closed".
struct SubmitGate {
    queue_tx: Option<Sender<QueuedTask>>,
    /// Never sent on; dropped on close so blocked submitters wake up.
    closing_tx: Option<Sender<()>>,
}

/// One-shot completion notification.
pub(crate) struct Completion {
    fired: Mutex<bool>,
    cvar: Condvar,
}

impl Completion {
    fn new() -> Self {
        Self {
            fired: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    fn fire(&self) {
        let mut fired = self.fired.lock();
        *fired = true;
        self.cvar.notify_all();
    }

    fn is_fired(&self) -> bool {
        *self.fired.lock()
    }

    pub(crate) fn wait(&self) {
        let mut fired = self.fired.lock();
        while !*fired {
            self.cvar.wait(&mut fired);
        }
    }

    fn wait_for(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut fired = self.fired.lock();
        while !*fired {
            if self.cvar.wait_until(&mut fired, deadline).timed_out() {
                return *fired;
            }
        }
        true
    }
}

/// State shared by the scheduler handle, the dispatch loop and every
/// execution thread.
pub(crate) struct Shared {
    id: Uuid,
    config: SchedulerConfig,
    gate: RwLock<SubmitGate>,
    closing: Receiver<()>,
    queue: Receiver<QueuedTask>,
    slots: Semaphore,
    cancel: CancelSignal,
    counters: SchedulerCounters,
    next_id: AtomicU64,
    lifecycle: Mutex<Lifecycle>,
    terminal: OnceLock<TerminalError>,
    pub(crate) completion: Completion,
    executor: Arc<dyn Executor>,
    logger: Arc<dyn Logger>,
    recovery: Arc<dyn RecoveryHook>,
}

impl Shared {
    pub(crate) fn add_task<F>(&self, task: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        let tx = self.sender()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let queued = QueuedTask::new(id, task);

        // Closing wins over a send that becomes possible at the same moment.
        select_biased! {
            recv(self.closing) -> _ => Err(SchedulerError::Closed),
            send(tx, queued) -> res => {
                if res.is_err() {
                    return Err(SchedulerError::Closed);
                }
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(id)
            }
        }
    }

    fn try_add_task<F>(&self, task: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        let tx = self.sender()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match tx.try_send(QueuedTask::new(id, task)) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(id)
            }
            Err(TrySendError::Full(_)) => Err(SchedulerError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(SchedulerError::Closed),
        }
    }

    fn sender(&self) -> Result<Sender<QueuedTask>, SchedulerError> {
        self.gate.read().queue_tx.clone().ok_or(SchedulerError::Closed)
    }

    /// Close submissions. Returns `true` only for the call that closed.
    fn close(&self) -> bool {
        let mut gate = self.gate.write();
        if gate.queue_tx.is_none() {
            return false;
        }
        gate.queue_tx = None;
        gate.closing_tx = None;
        true
    }

    fn is_closed(&self) -> bool {
        self.gate.read().queue_tx.is_none()
    }

    fn begin(&self) -> Result<(), SchedulerError> {
        let mut state = self.lifecycle.lock();
        if *state != Lifecycle::Idle {
            return Err(SchedulerError::AlreadyStarted);
        }
        *state = Lifecycle::Running;
        Ok(())
    }

    fn run_loop(self: &Arc<Self>) {
        // Fires completion even if a fault escapes every containment below.
        let _terminate = Terminate(Arc::as_ref(self));

        let exit = self.guarded(|| {
            self.logger.info(format_args!(
                "scheduler {} started, queue capacity: {}, concurrency: {}",
                self.id, self.config.queue_size, self.config.concurrency
            ));
            self.dispatch()
        });
        match exit {
            Some(Exit::Drained) => {}
            Some(Exit::Interrupted(cause)) => {
                let _ = self.terminal.set(cause);
                self.guarded(|| self.logger.error(format_args!("scheduler exit with: {cause}")));
                self.discard_queued();
            }
            None => self.discard_queued(),
        }

        self.guarded(|| self.slots.wait_idle());
        self.guarded(|| {
            self.logger.info(format_args!(
                "scheduler {} stopped, executed: {}, unexecuted: {}",
                self.id,
                self.counters.executed(),
                self.counters.unexecuted()
            ));
        });
    }

    /// Run a piece of the loop body, routing a panic to the recovery hook.
    fn guarded<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        contain(FaultOrigin::Dispatcher, &*self.recovery, &*self.logger, f)
    }

    fn dispatch(self: &Arc<Self>) -> Exit {
        let cancelled = self.cancel.cancelled();
        let deadline = self.cancel.deadline();

        loop {
            select! {
                send(self.slots.acquire_op(), ()) -> _ => {
                    let permit = self.slots.adopt();
                    select! {
                        recv(self.queue) -> msg => {
                            match msg {
                                Ok(queued) => self.spawn_execution(queued, permit),
                                // Closed and empty; the permit goes back on drop.
                                Err(_) => return Exit::Drained,
                            }
                        }
                        recv(cancelled) -> _ => return Exit::Interrupted(TerminalError::Cancelled),
                        recv(deadline) -> _ => return Exit::Interrupted(TerminalError::DeadlineExceeded),
                    }
                }
                recv(cancelled) -> _ => return Exit::Interrupted(TerminalError::Cancelled),
                recv(deadline) -> _ => return Exit::Interrupted(TerminalError::DeadlineExceeded),
            }
        }
    }

    fn spawn_execution(self: &Arc<Self>, queued: QueuedTask, permit: Permit) {
        let id = queued.meta.id;
        let shared = Arc::clone(self);

        let mut builder = thread::Builder::new().name(format!("{}-{id}", self.config.thread_name));
        if let Some(size) = self.config.thread_stack_size {
            builder = builder.stack_size(size);
        }

        // On failure the closure is dropped together with the task and the
        // permit, so only the accounting is left to do.
        if let Err(e) = builder.spawn(move || shared.execute(queued, permit)) {
            self.counters.unexecuted.fetch_add(1, Ordering::AcqRel);
            self.logger.error(format_args!("failed to spawn thread for task {id}: {e}"));
        }
    }

    fn execute(&self, queued: QueuedTask, permit: Permit) {
        let QueuedTask { meta, task } = queued;
        let origin = FaultOrigin::Task(meta.id);

        let outcome = contain(origin, &*self.recovery, &*self.logger, || {
            self.executor.execute(task, &meta)
        });
        match &outcome {
            Some(Ok(())) => {}
            Some(Err(_)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.counters.panicked.fetch_add(1, Ordering::Relaxed);
            }
        }
        // Count before releasing so the count is final once all slots are free.
        self.counters.executed.fetch_add(1, Ordering::AcqRel);

        if let Some(Err(err)) = outcome {
            contain(origin, &*self.recovery, &*self.logger, || {
                self.logger.error(format_args!("task {} failed with: {err:#}", meta.id));
            });
        }
        drop(permit);
    }

    /// Close submissions and discard everything still queued.
    ///
    /// Iterating until disconnection also picks up a task whose send raced
    /// the close: every sender clone is released as soon as its submitter
    /// observes the closing signal.
    fn discard_queued(&self) {
        self.close();
        let mut discarded = 0_u64;
        // A task whose drop panics must not leave the rest of the queue behind.
        while self.guarded(|| self.drain_queue(&mut discarded)).is_none() {}
        self.guarded(|| self.logger.info(format_args!("unexecuted tasks: {discarded}")));
    }

    fn drain_queue(&self, discarded: &mut u64) {
        for queued in &self.queue {
            self.counters.unexecuted.fetch_add(1, Ordering::AcqRel);
            *discarded += 1;
            drop(queued);
        }
    }
}

/// Marks the loop terminated and fires completion when dropped.
struct Terminate<'a>(&'a Shared);

impl Drop for Terminate<'_> {
    fn drop(&mut self) {
        *self.0.lifecycle.lock() = Lifecycle::Terminated;
        self.0.completion.fire();
    }
}

/// Bounded-concurrency task scheduler.
///
/// Share it between submitting threads with `Arc<Scheduler>`; every method
/// takes `&self`.
pub struct Scheduler {
    pub(crate) shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Scheduler with the default configuration, executor, logger and
    /// recovery hook.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            SchedulerConfig::default(),
            Arc::new(SimpleExecutor),
            Arc::new(TracingLogger),
            Arc::new(LogRecovery),
        )
    }

    /// Start building a customised scheduler.
    #[must_use]
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    /// Assemble a scheduler from an already validated configuration.
    pub(crate) fn from_parts(
        config: SchedulerConfig,
        executor: Arc<dyn Executor>,
        logger: Arc<dyn Logger>,
        recovery: Arc<dyn RecoveryHook>,
    ) -> Self {
        let (queue_tx, queue) = bounded(config.queue_size);
        let (closing_tx, closing) = bounded(0);

        let shared = Shared {
            id: Uuid::new_v4(),
            gate: RwLock::new(SubmitGate {
                queue_tx: Some(queue_tx),
                closing_tx: Some(closing_tx),
            }),
            closing,
            queue,
            slots: Semaphore::new(config.concurrency),
            cancel: CancelSignal::new(config.timeout()),
            counters: SchedulerCounters::default(),
            next_id: AtomicU64::new(0),
            lifecycle: Mutex::new(Lifecycle::Idle),
            terminal: OnceLock::new(),
            completion: Completion::new(),
            executor,
            logger,
            recovery,
            config,
        };

        Self {
            shared: Arc::new(shared),
            dispatcher: Mutex::new(None),
        }
    }

    /// Start the dispatch loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyStarted` if the loop was started before
    /// - `SchedulerError::Spawn` if the dispatch thread could not be created
    pub fn start(&self) -> Result<(), SchedulerError> {
        self.shared.begin()?;

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("{}-dispatch", self.shared.config.thread_name))
            .spawn(move || shared.run_loop());

        match spawned {
            Ok(handle) => {
                *self.dispatcher.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                *self.shared.lifecycle.lock() = Lifecycle::Idle;
                Err(SchedulerError::Spawn(e.to_string()))
            }
        }
    }

    /// Run the dispatch loop on the calling thread until it terminates.
    ///
    /// # Errors
    ///
    /// `SchedulerError::AlreadyStarted` if the loop was started before.
    pub fn run(&self) -> Result<(), SchedulerError> {
        self.shared.begin()?;
        self.shared.run_loop();
        Ok(())
    }

    /// Enqueue a task, blocking while the queue is full.
    ///
    /// A submitter blocked on a full queue returns `SchedulerError::Closed` as
    /// soon as the scheduler closes.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` if closure was requested.
    pub fn add_task<F>(&self, task: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        self.shared.add_task(task)
    }

    /// Enqueue a task without blocking.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Closed` if closure was requested
    /// - `SchedulerError::QueueFull` if the queue is at capacity
    pub fn try_add_task<F>(&self, task: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        self.shared.try_add_task(task)
    }

    /// Stop accepting tasks. Queued tasks still run. Idempotent.
    pub fn finish(&self) {
        if self.shared.close() {
            self.shared.logger.info(format_args!("scheduler {} closed to new tasks", self.shared.id));
        }
    }

    /// Whether closure has been requested.
    #[must_use]
    pub fn closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Fire the cancellation signal. Idempotent; no effect once the loop has
    /// terminated.
    pub fn cancel(&self) {
        if self.is_terminated() {
            return;
        }
        if self.shared.cancel.cancel() {
            self.shared.logger.info(format_args!("scheduler {} cancellation requested", self.shared.id));
        }
    }

    /// Whether `cancel` has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Block until the dispatch loop has terminated.
    pub fn wait(&self) {
        self.shared.completion.wait();
        self.join_dispatcher();
    }

    /// Block until the loop terminates or `timeout` elapses. Returns whether
    /// the loop terminated.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let done = self.shared.completion.wait_for(timeout);
        if done {
            self.join_dispatcher();
        }
        done
    }

    /// Take the dispatch thread's handle, if nobody joined it yet.
    pub(crate) fn take_dispatcher(&self) -> Option<JoinHandle<()>> {
        self.dispatcher.lock().take()
    }

    fn join_dispatcher(&self) {
        if let Some(handle) = self.take_dispatcher() {
            // The loop already contains its own panics.
            let _ = handle.join();
        }
    }

    /// Tasks that ran, whatever their outcome. Final once `wait` returns.
    #[must_use]
    pub fn executed_count(&self) -> u64 {
        self.shared.counters.executed()
    }

    /// Tasks discarded without running. Final once `wait` returns.
    #[must_use]
    pub fn unexecuted_count(&self) -> u64 {
        self.shared.counters.unexecuted()
    }

    /// Description of the terminal condition, empty after a clean drain.
    #[must_use]
    pub fn error(&self) -> String {
        self.terminal_error().map(|e| e.to_string()).unwrap_or_default()
    }

    /// Terminal condition, `None` after a clean drain or while running.
    #[must_use]
    pub fn terminal_error(&self) -> Option<TerminalError> {
        self.shared.terminal.get().copied()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        *self.shared.lifecycle.lock()
    }

    /// Whether the loop has terminated and the completion signal fired.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.shared.completion.is_fired()
    }

    /// Unique id of this scheduler instance, used in log lines.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Configuration the scheduler was built with.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Snapshot of counters and occupancy.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        let shared = &self.shared;
        shared.counters.snapshot(
            shared.slots.capacity(),
            shared.config.queue_size,
            shared.queue.len(),
            shared.slots.in_use(),
        )
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("closed", &self.closed())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Nobody can submit through a dropped handle; close so a running loop
        // drains and exits instead of waiting forever. Don't join here.
        self.shared.close();
    }
}
