//! Thread-safe slot: the [`Slot`] contract behind a mutex.

use crate::core::Result;
use crate::slot::Slot;
use parking_lot::Mutex;

/// A [`Slot`] wrapped in a mutual-exclusion lock.
///
/// Every operation — `set`, `clear`, `get`, `with`, `has_value`, and hook
/// registration — acquires the lock for its full duration. Hooks run while
/// the lock is held, so two concurrent transitions can never interleave
/// their destroy/create sequences: transitions are strictly ordered by lock
/// acquisition, and the last writer to acquire the lock determines the
/// final value.
///
/// The failure contract is identical to [`Slot`]: the plain and
/// synchronized variants share one implementation, so the hook ordering
/// cannot diverge between them.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use worker_lifecycle::slot::SyncSlot;
///
/// let slot = Arc::new(SyncSlot::new());
///
/// let writer = {
///     let slot = Arc::clone(&slot);
///     thread::spawn(move || slot.set(42).unwrap())
/// };
/// writer.join().unwrap();
///
/// assert_eq!(slot.get(), Some(42));
/// ```
pub struct SyncSlot<T> {
    inner: Mutex<Slot<T>>,
}

impl<T> std::fmt::Debug for SyncSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSlot")
            .field("has_value", &self.has_value())
            .finish()
    }
}

impl<T> SyncSlot<T> {
    /// Create an empty synchronized slot with no hooks.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Slot::new()),
        }
    }

    /// Create a synchronized slot already holding `value`. No hook fires.
    pub fn with_value(value: T) -> Self {
        Self {
            inner: Mutex::new(Slot::with_value(value)),
        }
    }

    /// `true` iff a value is present.
    pub fn has_value(&self) -> bool {
        self.inner.lock().has_value()
    }

    /// Run `f` on the current value (or absence) while holding the lock.
    ///
    /// This is the accessor for values that are not `Clone`; the reference
    /// cannot escape the lock.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.lock().get())
    }

    /// Register (or replace) the create hook. Takes the lock; a transition
    /// in another thread is either fully before or fully after the swap.
    pub fn on_create<F>(&self, hook: F)
    where
        F: FnMut(&T) -> Result<()> + Send + 'static,
    {
        self.inner.lock().on_create(hook);
    }

    /// Register (or replace) the destroy hook. Takes the lock.
    pub fn on_destroy<F>(&self, hook: F)
    where
        F: FnMut(&T) -> Result<()> + Send + 'static,
    {
        self.inner.lock().on_destroy(hook);
    }

    /// Store `value`, firing hooks under the lock.
    ///
    /// Returns the displaced value, if any.
    ///
    /// # Errors
    ///
    /// Propagates a hook failure; see [`Slot`] for the failure contract.
    pub fn set(&self, value: T) -> Result<Option<T>> {
        self.inner.lock().set(value)
    }

    /// Clear the slot under the lock. Equivalent to setting an absent value.
    ///
    /// Returns the displaced value, if any.
    ///
    /// # Errors
    ///
    /// Propagates a destroy hook failure, in which case the value stays.
    pub fn clear(&self) -> Result<Option<T>> {
        self.inner.lock().clear()
    }
}

impl<T: Clone> SyncSlot<T> {
    /// Get a clone of the current value, if present. No side effects.
    pub fn get(&self) -> Option<T> {
        self.inner.lock().get().cloned()
    }
}

impl<T> Default for SyncSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
