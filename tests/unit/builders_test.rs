//! Tests for builder modules

use prometheus_task_scheduler::builders::SchedulerBuilder;
use prometheus_task_scheduler::config::SchedulerConfig;
use prometheus_task_scheduler::core::{Lifecycle, SchedulerError, StdLogger};
use std::time::Duration;

#[test]
fn test_scheduler_builder_defaults() {
    let builder = SchedulerBuilder::new();
    assert_eq!(builder.config(), &SchedulerConfig::default());

    let scheduler = builder.build().unwrap();
    assert_eq!(scheduler.state(), Lifecycle::Idle);
    assert!(!scheduler.closed());
    assert_eq!(scheduler.stats().concurrency, 5);
    assert_eq!(scheduler.stats().queue_capacity, 100);
}

#[test]
fn test_scheduler_builder_from_config() {
    let config = SchedulerConfig::new()
        .with_concurrency(2)
        .with_queue_size(4)
        .with_timeout(Duration::from_millis(750));

    let scheduler = SchedulerBuilder::from_config(config.clone())
        .with_logger(StdLogger)
        .build()
        .unwrap();
    assert_eq!(scheduler.config(), &config);
}

#[test]
fn test_scheduler_builder_rejects_invalid() {
    let err = SchedulerBuilder::new().with_queue_size(0).build().unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[test]
fn test_scheduler_ids_are_unique() {
    let a = SchedulerBuilder::new().build().unwrap();
    let b = SchedulerBuilder::new().build().unwrap();
    assert_ne!(a.id(), b.id());
}
