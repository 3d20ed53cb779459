//! Single-value holder with lifecycle hooks.

use crate::core::Result;
use crate::slot::Transition;

/// Hook invoked when a value has been stored in a slot.
pub type CreateHook<T> = Box<dyn FnMut(&T) -> Result<()> + Send>;

/// Hook invoked on the outgoing value before it is replaced or cleared.
pub type DestroyHook<T> = Box<dyn FnMut(&T) -> Result<()> + Send>;

/// A holder for at most one value of type `T`, with optional creation and
/// destruction hooks fired on presence transitions.
///
/// The hook-firing rules are exactly the [`Transition`] table: the destroy
/// hook fires only when the *previous* value was present, the create hook
/// only when the *new* value is present. Setting over an empty slot never
/// fires destroy; clearing an empty slot fires nothing.
///
/// # Failure contract
///
/// Hooks report failure through their `Result`, and a failing hook aborts
/// the transition rather than being swallowed or retried:
///
/// - a destroy hook error propagates out of [`set`](Slot::set)/[`clear`](Slot::clear)
///   **before** the store, so the old value stays in place;
/// - a create hook error (the hook runs after the store) empties the slot
///   again — the new value is dropped without firing the destroy hook — and
///   the error propagates.
///
/// This is deliberately non-atomic on failure: a `Replace` whose create hook
/// fails has already destroyed the old value and ends with an empty slot.
///
/// # Example
///
/// ```rust
/// use worker_lifecycle::slot::Slot;
///
/// # fn main() -> worker_lifecycle::core::Result<()> {
/// let mut slot = Slot::new();
/// slot.on_create(|v: &String| {
///     println!("created: {}", v);
///     Ok(())
/// });
///
/// slot.set("hello".to_string())?;
/// assert!(slot.has_value());
///
/// slot.clear()?;
/// assert!(!slot.has_value());
/// # Ok(())
/// # }
/// ```
pub struct Slot<T> {
    value: Option<T>,
    create: Option<CreateHook<T>>,
    destroy: Option<DestroyHook<T>>,
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("has_value", &self.value.is_some())
            .field("has_create_hook", &self.create.is_some())
            .field("has_destroy_hook", &self.destroy.is_some())
            .finish()
    }
}

impl<T> Slot<T> {
    /// Create an empty slot with no hooks.
    pub fn new() -> Self {
        Self {
            value: None,
            create: None,
            destroy: None,
        }
    }

    /// Create a slot already holding `value`.
    ///
    /// No hook fires; hooks can only be registered on an existing slot.
    pub fn with_value(value: T) -> Self {
        Self {
            value: Some(value),
            create: None,
            destroy: None,
        }
    }

    /// Get a reference to the current value, if present. No side effects.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// `true` iff a value is present.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Register (or replace) the create hook.
    ///
    /// The hook does not fire retroactively for a value already present.
    pub fn on_create<F>(&mut self, hook: F)
    where
        F: FnMut(&T) -> Result<()> + Send + 'static,
    {
        self.create = Some(Box::new(hook));
    }

    /// Register (or replace) the destroy hook.
    ///
    /// The hook does not fire retroactively for a value already present.
    pub fn on_destroy<F>(&mut self, hook: F)
    where
        F: FnMut(&T) -> Result<()> + Send + 'static,
    {
        self.destroy = Some(Box::new(hook));
    }

    /// Store `value`, firing hooks per the [`Transition`] table.
    ///
    /// Returns the displaced value, if any.
    ///
    /// # Errors
    ///
    /// Propagates a hook failure; see the type-level failure contract.
    pub fn set(&mut self, value: T) -> Result<Option<T>> {
        self.apply(Some(value))
    }

    /// Clear the slot. Equivalent to setting an absent value.
    ///
    /// Returns the displaced value, if any.
    ///
    /// # Errors
    ///
    /// Propagates a destroy hook failure, in which case the value stays.
    pub fn clear(&mut self) -> Result<Option<T>> {
        self.apply(None)
    }

    fn apply(&mut self, next: Option<T>) -> Result<Option<T>> {
        let transition = Transition::classify(self.value.as_ref(), next.as_ref());

        if transition.fires_destroy() {
            if let (Some(old), Some(hook)) = (self.value.as_ref(), self.destroy.as_mut()) {
                hook(old)?;
            }
        }

        let displaced = std::mem::replace(&mut self.value, next);

        if transition.fires_create() {
            if let (Some(new), Some(hook)) = (self.value.as_ref(), self.create.as_mut()) {
                if let Err(err) = hook(new) {
                    // create failed: leave the slot empty, not half-created
                    self.value = None;
                    return Err(err);
                }
            }
        }

        Ok(displaced)
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}
