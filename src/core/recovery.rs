//! Fault containment for panics raised by tasks or the dispatch loop.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::{Logger, TaskId};

/// Where a contained panic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOrigin {
    /// Inside a task execution.
    Task(TaskId),
    /// Inside the dispatch loop itself.
    Dispatcher,
}

impl fmt::Display for FaultOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Dispatcher => write!(f, "dispatcher"),
        }
    }
}

/// A panic that was caught before it could unwind further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Where the panic happened.
    pub origin: FaultOrigin,
    /// Rendered panic message.
    pub message: String,
}

impl Fault {
    /// Build a fault from a panic payload.
    #[must_use]
    pub fn from_payload(origin: FaultOrigin, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self { origin, message }
    }
}

/// Hook invoked with every contained panic.
///
/// After the hook returns, the routine that panicked returns normally: a
/// failing task never brings down the loop or the process.
pub trait RecoveryHook: Send + Sync + 'static {
    /// Observe a contained fault.
    fn recover(&self, fault: &Fault, logger: &dyn Logger);
}

/// Default hook: logs the panic through the scheduler's logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecovery;

impl RecoveryHook for LogRecovery {
    fn recover(&self, fault: &Fault, logger: &dyn Logger) {
        logger.error(format_args!("panic in {}: {}", fault.origin, fault.message));
    }
}

impl<F> RecoveryHook for F
where
    F: Fn(&Fault, &dyn Logger) + Send + Sync + 'static,
{
    fn recover(&self, fault: &Fault, logger: &dyn Logger) {
        self(fault, logger);
    }
}

/// Run `f`, routing a panic to `hook` instead of unwinding.
///
/// Returns `None` when `f` panicked. A panic raised by the hook itself is
/// swallowed as well.
pub(crate) fn contain<R>(
    origin: FaultOrigin,
    hook: &dyn RecoveryHook,
    logger: &dyn Logger,
    f: impl FnOnce() -> R,
) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let fault = Fault::from_payload(origin, payload.as_ref());
            if panic::catch_unwind(AssertUnwindSafe(|| hook.recover(&fault, logger))).is_err() {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    logger.error(format_args!("recovery hook panicked while handling {origin}"));
                }));
            }
            None
        }
    }
}
