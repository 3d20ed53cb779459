//! # Worker Lifecycle
//!
//! Lifecycle-managed value slots and a dedicated worker thread with a FIFO
//! message dispatch loop.
//!
//! ## Features
//!
//! - **Slots**: single-value holders firing creation/destruction hooks
//!   exactly once per presence transition
//! - **Synchronized Slots**: the same contract behind a lock, so concurrent
//!   transitions never interleave
//! - **Worker Lifecycle**: a strict create/destroy protocol for one
//!   background thread running a message loop
//! - **Dispatch Handles**: cloneable, epoch-bound capabilities to enqueue
//!   work for sequential execution on the worker thread
//! - **Failure Routing**: callback errors and panics go to an
//!   uncaught-failure handler on the worker thread, never to the enqueuer
//!
//! ## Quick Start
//!
//! ```rust
//! use worker_lifecycle::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Start a worker with a message callback
//! let lifecycle = WorkerLifecycle::new();
//! lifecycle.start(
//!     "app",
//!     |err| eprintln!("uncaught failure: {}", err),
//!     |message: String| {
//!         println!("processing: {}", message);
//!         Ok(())
//!     },
//! )?;
//!
//! // Hand out dispatch handles; messages run in order on the worker thread
//! let dispatcher = lifecycle.dispatcher().expect("worker is running");
//! dispatcher.dispatch("ping".to_string())?;
//!
//! // Cooperative shutdown: no join, queued messages are dropped
//! lifecycle.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Slots on Their Own
//!
//! ```rust
//! use worker_lifecycle::slot::Slot;
//!
//! # fn main() -> worker_lifecycle::core::Result<()> {
//! let mut slot = Slot::new();
//! slot.on_destroy(|conn: &String| {
//!     println!("closing {}", conn);
//!     Ok(())
//! });
//!
//! slot.set("db-primary".to_string())?;   // no destroy: slot was empty
//! slot.set("db-replica".to_string())?;   // destroy fires for "db-primary"
//! slot.clear()?;                          // destroy fires for "db-replica"
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod prelude;
pub mod slot;
pub mod worker;

pub use crate::core::{HookStage, LifecycleError, Result};
pub use crate::slot::{Slot, SyncSlot, Transition};
pub use crate::worker::{DispatchError, Dispatcher, WorkerLifecycle};
