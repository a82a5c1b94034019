//! Thread-safe handle to a stream manager
//!
//! The manager itself assumes one event at a time. Hosts that feed it from
//! several tasks share it through this handle so every admission decision
//! runs under one lock.

use std::sync::Arc;

use parking_lot::Mutex;

use super::manager::StreamConcurrencyManager;

/// Cloneable, lock-protected stream manager
pub struct SharedStreamManager<O, H> {
    inner: Arc<Mutex<StreamConcurrencyManager<O, H>>>,
}

impl<O, H> Clone for SharedStreamManager<O, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O, H> SharedStreamManager<O, H> {
    /// Wrap a manager for shared use
    #[must_use]
    pub fn new(manager: StreamConcurrencyManager<O, H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run `f` with exclusive access to the manager
    pub fn with<R>(&self, f: impl FnOnce(&mut StreamConcurrencyManager<O, H>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}
