//! A dedicated background worker thread with a FIFO message dispatch loop,
//! managed through lifecycle slots.

pub(crate) mod control;
mod dispatcher;
mod handle;
mod lifecycle;

pub use dispatcher::{DispatchError, Dispatcher};
pub use handle::{MessageCallback, UncaughtHandler, WorkerHandle};
pub use lifecycle::WorkerLifecycle;
