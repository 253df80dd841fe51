//! Cancellation signal with an optional deadline.

use std::time::{Duration, Instant};

use crossbeam_channel::{at, bounded, never, Receiver, Sender};
use parking_lot::Mutex;

/// One-shot cancellation signal.
///
/// Cancelling drops the trigger sender, which makes every clone of the
/// receiver permanently ready. The deadline, if any, is fixed at creation.
pub(crate) struct CancelSignal {
    trigger: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    pub(crate) fn new(timeout: Option<Duration>) -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Mutex::new(Some(tx)),
            rx,
            deadline: timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub(crate) fn cancel(&self) -> bool {
        self.trigger.lock().take().is_some()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.trigger.lock().is_none()
    }

    /// Receiver that is ready once the signal fired.
    pub(crate) const fn cancelled(&self) -> &Receiver<()> {
        &self.rx
    }

    /// Receiver that delivers once when the deadline passes (never without one).
    pub(crate) fn deadline(&self) -> Receiver<Instant> {
        self.deadline.map_or_else(never, at)
    }
}
