//! Builder that validates configuration and wires injected capabilities.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::core::{
    Executor, LogRecovery, Logger, RecoveryHook, Scheduler, SchedulerError, SimpleExecutor,
    TracingLogger,
};

/// Fluent construction of a [`Scheduler`].
///
/// Every capability defaults to the crate's standard implementation:
/// [`SimpleExecutor`], [`TracingLogger`] and [`LogRecovery`].
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    executor: Arc<dyn Executor>,
    logger: Arc<dyn Logger>,
    recovery: Arc<dyn RecoveryHook>,
}

impl SchedulerBuilder {
    /// Builder over the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(SchedulerConfig::default())
    }

    /// Builder starting from an existing configuration.
    #[must_use]
    pub fn from_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            executor: Arc::new(SimpleExecutor),
            logger: Arc::new(TracingLogger),
            recovery: Arc::new(LogRecovery),
        }
    }

    /// Bound the scheduler's total lifetime.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Maximum simultaneous task executions.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config = self.config.with_concurrency(concurrency);
        self
    }

    /// Maximum buffered tasks.
    #[must_use]
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.config = self.config.with_queue_size(queue_size);
        self
    }

    /// Prefix for scheduler thread names.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_thread_name(name);
        self
    }

    /// Replace the recovery hook.
    #[must_use]
    pub fn with_recovery_hook(mut self, hook: impl RecoveryHook) -> Self {
        self.recovery = Arc::new(hook);
        self
    }

    /// Replace the execution strategy.
    #[must_use]
    pub fn with_executor(mut self, executor: impl Executor) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Logger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Replace the logger with one that is also held elsewhere.
    #[must_use]
    pub fn with_shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Configuration as currently assembled.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidConfig` if validation fails.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        self.config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Scheduler::from_parts(
            self.config,
            self.executor,
            self.logger,
            self.recovery,
        ))
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchedulerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
