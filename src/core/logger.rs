//! Logger capability injected into each scheduler.

use std::fmt;
use std::io::Write;

/// Structured message sink used by the scheduler.
///
/// Implementations are fire-and-forget: they must not panic and must not block
/// the dispatch loop for any meaningful time.
pub trait Logger: Send + Sync + 'static {
    /// Record an informational message.
    fn info(&self, args: fmt::Arguments<'_>);
    /// Record an error message.
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Default logger: forwards messages to `tracing` under the
/// `task_scheduler` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "task_scheduler", "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "task_scheduler", "{}", args);
    }
}

/// Plain stream logger: `[INFO]` lines on stdout, `[ERROR]` lines on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdLogger;

impl Logger for StdLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        // A closed stdout is not worth failing a task over.
        let _ = writeln!(std::io::stdout().lock(), "[INFO] {args}");
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        let _ = writeln!(std::io::stderr().lock(), "[ERROR] {args}");
    }
}
