//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default maximum number of simultaneous task executions.
pub const DEFAULT_CONCURRENCY: usize = 5;
/// Default capacity of the task queue.
pub const DEFAULT_QUEUE_SIZE: usize = 100;
/// Default prefix for threads spawned by the scheduler.
pub const DEFAULT_THREAD_NAME: &str = "task-scheduler";

/// Configuration applied once when a scheduler is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of tasks executing at once.
    pub concurrency: usize,
    /// Maximum number of tasks buffered in the queue.
    pub queue_size: usize,
    /// Bound on the scheduler's total lifetime, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Prefix for the dispatch thread and task thread names.
    pub thread_name: String,
    /// Stack size for task threads; platform default when unset.
    pub thread_stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            queue_size: DEFAULT_QUEUE_SIZE,
            timeout_ms: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            thread_stack_size: None,
        }
    }
}

impl SchedulerConfig {
    /// Configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Bound the scheduler's lifetime, rounded up to whole milliseconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    /// Set the thread name prefix.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the stack size for task threads.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, size: usize) -> Self {
        self.thread_stack_size = Some(size);
        self
    }

    /// Configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".into());
        }
        if self.queue_size == 0 {
            return Err("queue_size must be greater than 0".into());
        }
        if self.timeout_ms == Some(0) {
            return Err("timeout_ms must be greater than 0".into());
        }
        if self.thread_name.is_empty() {
            return Err("thread_name must not be empty".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, loading a `.env`
    /// file first when one is present.
    ///
    /// Recognised variables: `SCHEDULER_CONCURRENCY`, `SCHEDULER_QUEUE_SIZE`,
    /// `SCHEDULER_TIMEOUT_MS`, `SCHEDULER_THREAD_NAME`,
    /// `SCHEDULER_THREAD_STACK_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup using the same
    /// variable names as [`SchedulerConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the key that failed to parse, or the
    /// validation failure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_key(&lookup, "SCHEDULER_CONCURRENCY")? {
            cfg.concurrency = v;
        }
        if let Some(v) = parse_key(&lookup, "SCHEDULER_QUEUE_SIZE")? {
            cfg.queue_size = v;
        }
        if let Some(v) = parse_key(&lookup, "SCHEDULER_TIMEOUT_MS")? {
            cfg.timeout_ms = Some(v);
        }
        if let Some(v) = lookup("SCHEDULER_THREAD_NAME") {
            cfg.thread_name = v;
        }
        if let Some(v) = parse_key(&lookup, "SCHEDULER_THREAD_STACK_SIZE")? {
            cfg.thread_stack_size = Some(v);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_key<F, T>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| format!("{key}: invalid value `{raw}`: {e}"))
        })
        .transpose()
}
