//! Tests for configuration validation

use prometheus_task_scheduler::config::{SchedulerConfig, DEFAULT_CONCURRENCY, DEFAULT_QUEUE_SIZE};
use std::time::Duration;

#[test]
fn test_scheduler_config_defaults() {
    let config = SchedulerConfig::default();
    assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    assert_eq!(config.queue_size, DEFAULT_QUEUE_SIZE);
    assert_eq!(config.timeout_ms, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_concurrency() {
    let invalid = SchedulerConfig::new().with_concurrency(0);
    assert_eq!(invalid.validate().unwrap_err(), "concurrency must be greater than 0");
}

#[test]
fn test_scheduler_config_invalid_queue_size() {
    let invalid = SchedulerConfig::new().with_queue_size(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_timeout() {
    let invalid = SchedulerConfig::new().with_timeout(Duration::ZERO);
    assert_eq!(invalid.validate().unwrap_err(), "timeout_ms must be greater than 0");
}

#[test]
fn test_scheduler_config_invalid_thread_name() {
    let invalid = SchedulerConfig::new().with_thread_name("");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "concurrency": 8,
        "queue_size": 32,
        "timeout_ms": 5000
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.concurrency, 8);
    assert_eq!(config.queue_size, 32);
    assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    assert_eq!(config.thread_name, "task-scheduler");
}

#[test]
fn test_scheduler_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"concurrency": 0}"#).is_err());
    let err = SchedulerConfig::from_json_str("not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_scheduler_config_round_trips_through_json() {
    let config = SchedulerConfig::new()
        .with_concurrency(2)
        .with_thread_stack_size(256 * 1024);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), config);
}
