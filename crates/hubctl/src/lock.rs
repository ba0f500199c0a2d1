//! Per-device mutual exclusion
//!
//! Only one isolation may be in flight against a given hub. Callers that
//! share a [`DeviceLocks`] across threads are serialized per serial number;
//! different hubs proceed independently.

use protocol::SerialNumber;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

#[derive(Debug, Default)]
pub struct DeviceLocks {
    locks: Mutex<HashMap<SerialNumber, Arc<Mutex<()>>>>,
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, serial: SerialNumber) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(serial).or_default())
    }

    /// Run `f` while holding the lock for `serial`
    ///
    /// Blocks until any other holder of the same serial finishes. A holder
    /// that panicked does not poison the device for later callers.
    pub fn with_device<T>(&self, serial: SerialNumber, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(serial);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("Holding device lock for {}", serial);
        f()
    }
}
