//! # Prometheus Task Scheduler
//!
//! A bounded-concurrency task scheduler for CPU- and IO-heavy background work.
//!
//! Callers submit zero-argument closures that return `AppResult<()>`. A fixed
//! number of concurrency slots caps how many run at once, a bounded queue
//! buffers the rest, and a dispatch loop hands queued work to dedicated
//! threads until the queue is closed and drained, or a deadline or
//! cancellation fires.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: never more than `concurrency` tasks in flight
//! - **Backpressure**: a full queue blocks submitters instead of buffering
//!   without limit
//! - **Deadlines and cancellation**: queued work is discarded and counted when
//!   the scheduler is cancelled or times out; running work is never preempted
//! - **Fault containment**: task panics go to a recovery hook, never to the
//!   process
//! - **Injected capabilities**: execution strategy, logger and recovery hook
//!   are supplied per scheduler, with no global state
//!
//! ## Example
//!
//! ```rust,ignore
//! use prometheus_task_scheduler::core::Scheduler;
//! use std::time::Duration;
//!
//! let scheduler = Scheduler::builder()
//!     .with_concurrency(4)
//!     .with_queue_size(64)
//!     .with_timeout(Duration::from_secs(30))
//!     .build()?;
//! scheduler.start()?;
//!
//! for url in urls {
//!     scheduler.add_task(move || fetch(&url))?;
//! }
//! scheduler.finish();
//! scheduler.wait();
//!
//! assert_eq!(scheduler.error(), "");
//! ```
//!
//! For complete examples, see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions, the scheduler and its capabilities.
pub mod core;
/// Configuration models for schedulers.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Runtime adapters (async bridge).
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::builders::SchedulerBuilder;
pub use crate::config::SchedulerConfig;
pub use crate::core::{AppResult, Scheduler, SchedulerError, TerminalError};
