//! Counting semaphore over a bounded channel.
//!
//! Each in-flight execution holds one token in the channel. Acquiring sends a
//! token (blocking while the channel is full), releasing receives one. Because
//! acquisition is a plain channel send it can take part in a
//! `crossbeam_channel::select!` alongside cancellation.

use crossbeam_channel::{bounded, Receiver, Sender};

/// Bounded set of concurrency slots.
pub(crate) struct Semaphore {
    tx: Sender<()>,
    rx: Receiver<()>,
    capacity: usize,
}

impl Semaphore {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Send side, for use as a `select!` operation. A successful send must be
    /// turned into a [`Permit`] with [`Semaphore::adopt`].
    pub(crate) const fn acquire_op(&self) -> &Sender<()> {
        &self.tx
    }

    /// Wrap a token that was already sent through [`Semaphore::acquire_op`].
    pub(crate) fn adopt(&self) -> Permit {
        Permit {
            rx: self.rx.clone(),
        }
    }

    /// Block until a slot is free.
    pub(crate) fn acquire(&self) -> Permit {
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(());
        self.adopt()
    }

    /// Take a slot if one is free right now.
    #[cfg(test)]
    pub(crate) fn try_acquire(&self) -> Option<Permit> {
        self.tx.try_send(()).ok().map(|()| self.adopt())
    }

    /// Slots currently held.
    pub(crate) fn in_use(&self) -> usize {
        self.tx.len()
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until every slot is free, then leave them all free.
    pub(crate) fn wait_idle(&self) {
        let permits: Vec<Permit> = (0..self.capacity).map(|_| self.acquire()).collect();
        drop(permits);
    }
}

/// One held slot; released on drop.
#[derive(Debug)]
pub(crate) struct Permit {
    rx: Receiver<()>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        let _ = self.rx.try_recv();
    }
}
