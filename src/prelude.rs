//! Convenient re-exports for common types and traits

pub use crate::core::{HookStage, LifecycleError, Result};
pub use crate::slot::{Slot, SyncSlot, Transition};
pub use crate::worker::{DispatchError, Dispatcher, WorkerLifecycle};
