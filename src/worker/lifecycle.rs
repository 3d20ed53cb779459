//! The Idle/Running state machine governing one worker thread.

use crate::core::{LifecycleError, Result};
use crate::slot::SyncSlot;
use crate::worker::control::LoopControl;
use crate::worker::dispatcher::Dispatcher;
use crate::worker::handle::WorkerHandle;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create/destroy protocol for one dedicated worker thread with a FIFO
/// message loop.
///
/// A lifecycle composes two [`SyncSlot`]s: one holding the worker-thread
/// handle, one holding the dispatch handle bound to that thread's loop.
/// [`start`](WorkerLifecycle::start) drives the thread slot's creator hook
/// (launch the thread) and then advertises a fresh [`Dispatcher`];
/// [`stop`](WorkerLifecycle::stop) withdraws the dispatcher first, then
/// fires the thread slot's destructor hook (request quit, wake the loop).
/// The same instance may cycle Idle → Running → Idle indefinitely; each
/// Running period is one thread with one loop.
///
/// `stop` is fire-and-forget: it requests cooperative termination and
/// returns without joining. A caller that needs a confirmed-stopped
/// guarantee must add its own synchronization.
///
/// # Example
///
/// ```rust
/// use worker_lifecycle::prelude::*;
///
/// # fn main() -> Result<()> {
/// let lifecycle = WorkerLifecycle::new();
/// lifecycle.start(
///     "echo",
///     |err| eprintln!("uncaught failure: {}", err),
///     |message: String| {
///         println!("worker got: {}", message);
///         Ok(())
///     },
/// )?;
///
/// let dispatcher = lifecycle.dispatcher().expect("worker is running");
/// dispatcher.dispatch("ping".to_string())?;
///
/// lifecycle.stop()?;
/// assert!(lifecycle.dispatcher().is_none());
/// # Ok(())
/// # }
/// ```
pub struct WorkerLifecycle<M> {
    thread_slot: SyncSlot<WorkerHandle<M>>,
    dispatch_slot: SyncSlot<Dispatcher<M>>,
    running: AtomicBool,
}

impl<M> std::fmt::Debug for WorkerLifecycle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerLifecycle")
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish()
    }
}

impl<M: Send + 'static> WorkerLifecycle<M> {
    /// Create a lifecycle in the Idle state.
    pub fn new() -> Self {
        Self {
            thread_slot: SyncSlot::new(),
            dispatch_slot: SyncSlot::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Start one worker thread named after `owner`, running a message loop
    /// that feeds every dispatched message to `callback`.
    ///
    /// Callback errors and panics are routed to `on_uncaught` on the worker
    /// thread; they never reach the enqueuing caller and do not stop the
    /// loop.
    ///
    /// The thread slot's creator hook runs synchronously, so `start`
    /// returns only after the thread has been launched (the loop may still
    /// be warming up; dispatched messages queue until it is).
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyRunning`] if called while Running;
    /// - [`LifecycleError::StartFailed`] if the creator hook fails, in
    ///   which case the thread slot is left empty.
    pub fn start<H, F>(&self, owner: impl Into<String>, on_uncaught: H, callback: F) -> Result<()>
    where
        H: Fn(LifecycleError) + Send + Sync + 'static,
        F: Fn(M) -> Result<()> + Send + Sync + 'static,
    {
        let owner = owner.into();

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LifecycleError::already_running(owner));
        }

        // A fresh channel pair per Running period: dispatchers from an
        // earlier period can never reach this loop.
        let (message_tx, message_rx) = crossbeam_channel::unbounded();
        let (quit_tx, quit_rx) = crossbeam_channel::bounded(1);
        let control = Arc::new(LoopControl::new(quit_tx));

        let handle = WorkerHandle::new(
            owner.clone(),
            message_rx,
            quit_rx,
            Arc::new(callback),
            Arc::new(on_uncaught),
            Arc::clone(&control),
        );
        let dispatcher = Dispatcher::new(message_tx, control);

        // Creator: launch the thread. Runs inside set(), under the slot lock.
        self.thread_slot
            .on_create(|handle: &WorkerHandle<M>| handle.launch());
        // Destructor: if the loop is still up, ask it to quit, then wake it.
        self.thread_slot.on_destroy(|handle: &WorkerHandle<M>| {
            if handle.loop_active() {
                handle.request_quit();
            }
            Ok(())
        });

        if let Err(err) = self.thread_slot.set(handle) {
            self.running.store(false, Ordering::Release);
            return Err(LifecycleError::start_failed(owner, err));
        }

        if let Err(err) = self.dispatch_slot.set(dispatcher) {
            let _ = self.thread_slot.clear();
            self.running.store(false, Ordering::Release);
            return Err(LifecycleError::start_failed(owner, err));
        }

        debug!("worker '{}' started", owner);
        Ok(())
    }

    /// The current dispatch handle, or `None` when Idle.
    ///
    /// The handle is a capability to enqueue only; lifecycle state can only
    /// be changed through this type.
    pub fn dispatcher(&self) -> Option<Dispatcher<M>> {
        self.dispatch_slot.get()
    }

    /// `true` while a worker thread is held (Running).
    pub fn is_running(&self) -> bool {
        self.thread_slot.has_value()
    }

    /// Stop the worker: withdraw the dispatch handle, then clear the thread
    /// slot, whose destructor hook requests loop termination and wakes the
    /// loop. Messages still queued are dropped. Idempotent when Idle.
    ///
    /// Does not wait for the thread to exit: no join, no timeout.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::StopFailed`] if the destructor hook fails. The
    /// slots are hook-before-store, so in that case the dispatch handle is
    /// already withdrawn but the thread slot still holds the old handle.
    pub fn stop(&self) -> Result<()> {
        self.dispatch_slot
            .clear()
            .map_err(LifecycleError::stop_failed)?;
        self.thread_slot
            .clear()
            .map_err(LifecycleError::stop_failed)?;
        self.running.store(false, Ordering::Release);
        debug!("worker stopped");
        Ok(())
    }
}

impl<M: Send + 'static> Default for WorkerLifecycle<M> {
    fn default() -> Self {
        Self::new()
    }
}
