//! Scheduler counters and statistics snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a scheduler.
///
/// Counter values are only final once `Scheduler::wait` has returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Configured concurrency limit.
    pub concurrency: usize,
    /// Configured queue capacity.
    pub queue_capacity: usize,
    /// Tasks waiting in the queue.
    pub queued: usize,
    /// Tasks holding a concurrency slot.
    pub in_flight: usize,
    /// Tasks accepted by `add_task`.
    pub submitted: u64,
    /// Tasks that ran, whatever their outcome.
    pub executed: u64,
    /// Tasks discarded without running on cancellation or timeout.
    pub unexecuted: u64,
    /// Executed tasks that returned an error.
    pub failed: u64,
    /// Executed tasks that panicked.
    pub panicked: u64,
}

/// Thread-safe counters shared between the loop and execution threads.
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub submitted: AtomicU64,
    pub executed: AtomicU64,
    pub unexecuted: AtomicU64,
    pub failed: AtomicU64,
    pub panicked: AtomicU64,
}

impl SchedulerCounters {
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Acquire)
    }

    pub fn unexecuted(&self) -> u64 {
        self.unexecuted.load(Ordering::Acquire)
    }

    pub fn snapshot(
        &self,
        concurrency: usize,
        queue_capacity: usize,
        queued: usize,
        in_flight: usize,
    ) -> SchedulerStats {
        SchedulerStats {
            concurrency,
            queue_capacity,
            queued,
            in_flight,
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed(),
            unexecuted: self.unexecuted(),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}
