//! Tests for error types

use prometheus_task_scheduler::core::{SchedulerError, TerminalError};

#[test]
fn test_closed_error() {
    assert_eq!(format!("{}", SchedulerError::Closed), "scheduler closed");
}

#[test]
fn test_queue_full_error() {
    assert_eq!(format!("{}", SchedulerError::QueueFull), "task queue is full");
}

#[test]
fn test_already_started_error() {
    assert_eq!(format!("{}", SchedulerError::AlreadyStarted), "scheduler already started");
}

#[test]
fn test_spawn_error() {
    let err = SchedulerError::Spawn("resource temporarily unavailable".to_string());
    assert_eq!(format!("{}", err), "failed to spawn thread: resource temporarily unavailable");
}

#[test]
fn test_terminal_errors() {
    assert_eq!(format!("{}", TerminalError::Cancelled), "scheduler cancelled");
    assert_eq!(format!("{}", TerminalError::DeadlineExceeded), "scheduler deadline exceeded");
}
