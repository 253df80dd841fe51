//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Closure was requested; no further tasks are accepted.
    #[error("scheduler closed")]
    Closed,
    /// The task queue is at capacity (non-blocking submission only).
    #[error("task queue is full")]
    QueueFull,
    /// The dispatch loop was already started once.
    #[error("scheduler already started")]
    AlreadyStarted,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An OS thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(String),
}

/// Terminal condition of a scheduler that did not drain cleanly.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TerminalError {
    /// `cancel` was called while the loop was running.
    #[error("scheduler cancelled")]
    Cancelled,
    /// The configured timeout elapsed.
    #[error("scheduler deadline exceeded")]
    DeadlineExceeded,
}

/// Application-facing result using anyhow for task outcomes.
pub type AppResult<T> = Result<T, anyhow::Error>;
