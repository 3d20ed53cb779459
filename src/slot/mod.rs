//! Lifecycle-managed single-value containers.
//!
//! A [`Slot`] holds at most one value and fires optional creation and
//! destruction hooks on presence transitions; [`Transition`] is the explicit
//! four-way table those rules follow. [`SyncSlot`] is the same contract
//! behind a mutex for use across threads.

mod plain;
mod sync;
mod transition;

pub use plain::{CreateHook, DestroyHook, Slot};
pub use sync::SyncSlot;
pub use transition::Transition;
