//! Core scheduling abstractions: the scheduler, its task contract and the
//! capabilities injected into it.

pub mod error;
pub mod executor;
pub mod logger;
pub mod recovery;
pub mod scheduler;
pub mod stats;
pub mod task;

mod cancel;
mod semaphore;

pub use error::{AppResult, SchedulerError, TerminalError};
pub use executor::{Executor, SimpleExecutor, TracedExecutor};
pub use logger::{Logger, StdLogger, TracingLogger};
pub use recovery::{Fault, FaultOrigin, LogRecovery, RecoveryHook};
pub use scheduler::{Lifecycle, Scheduler};
pub use stats::SchedulerStats;
pub use task::{Task, TaskId, TaskMeta};
