//! Counting gate bounding the number of live connection handlers.
//!
//! The accept loop takes a [`SlotPermit`] before it accepts, so once every
//! slot is busy further clients stay queued in the kernel's listen backlog
//! instead of being refused. Permits release their slot on drop, which covers
//! normal completion, early returns and unwinding alike.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Shared pool of handler slots.
#[derive(Debug)]
pub(crate) struct ConnectionSlots {
    capacity: usize,
    active: Mutex<usize>,
    released: Condvar,
}

impl ConnectionSlots {
    pub(crate) fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity,
            active: Mutex::new(0),
            released: Condvar::new(),
        })
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handlers currently holding a slot.
    pub(crate) fn active(&self) -> usize {
        *self.lock()
    }

    /// Waits up to `timeout` for a free slot.
    ///
    /// Returns `None` when the wait expires so callers can poll for shutdown.
    pub(crate) fn acquire_for(self: &Arc<Self>, timeout: Duration) -> Option<SlotPermit> {
        let guard = self.lock();
        let (mut active, _timeout) = self
            .released
            .wait_timeout_while(guard, timeout, |active| *active >= self.capacity)
            .unwrap_or_else(|poison| poison.into_inner());
        if *active >= self.capacity {
            return None;
        }
        *active += 1;
        Some(SlotPermit {
            slots: Arc::clone(self),
        })
    }

    fn release(&self) {
        let mut active = self.lock();
        *active = active.saturating_sub(1);
        self.released.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

/// Proof of a held slot; dropping it frees the slot.
#[derive(Debug)]
pub(crate) struct SlotPermit {
    slots: Arc<ConnectionSlots>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        self.slots.release();
    }
}
