//! Configuration models for schedulers.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, DEFAULT_CONCURRENCY, DEFAULT_QUEUE_SIZE, DEFAULT_THREAD_NAME};
