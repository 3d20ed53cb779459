//! The worker-thread handle and its message loop.
//!
//! A [`WorkerHandle`] is the value held by the lifecycle's thread slot. It
//! carries everything the worker thread needs (receivers, the per-message
//! callback, the uncaught-failure handler) and launches the thread exactly
//! once; shutdown is cooperative and never joins.

use crate::core::{LifecycleError, Result};
use crate::worker::control::LoopControl;
use crossbeam_channel::{select, Receiver};
use log::{debug, error, warn};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Callback invoked on the worker thread for every dispatched message.
pub type MessageCallback<M> = Arc<dyn Fn(M) -> Result<()> + Send + Sync>;

/// Handler invoked on the worker thread when a dispatched message fails or
/// panics. Failures are routed here, never back to the enqueuing caller.
pub type UncaughtHandler = Arc<dyn Fn(LifecycleError) + Send + Sync>;

/// Everything the worker thread consumes; taken out of the handle exactly
/// once at launch.
struct LaunchBundle<M> {
    messages: Receiver<M>,
    quit: Receiver<()>,
    callback: MessageCallback<M>,
    on_uncaught: UncaughtHandler,
}

/// Identity of one worker thread and the means to launch and shut it down.
///
/// External components never see this type's instances; the lifecycle keeps
/// it in its thread slot and hands out only [`Dispatcher`]s.
///
/// Dropping a handle requests loop termination (without joining), so an
/// abandoned lifecycle does not leak a live loop.
///
/// [`Dispatcher`]: crate::worker::Dispatcher
pub struct WorkerHandle<M> {
    name: String,
    control: Arc<LoopControl>,
    bundle: Mutex<Option<LaunchBundle<M>>>,
    join: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<M> std::fmt::Debug for WorkerHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.name)
            .field("control", &self.control)
            .finish()
    }
}

impl<M: Send + 'static> WorkerHandle<M> {
    pub(crate) fn new(
        name: impl Into<String>,
        messages: Receiver<M>,
        quit: Receiver<()>,
        callback: MessageCallback<M>,
        on_uncaught: UncaughtHandler,
        control: Arc<LoopControl>,
    ) -> Self {
        Self {
            name: name.into(),
            control,
            bundle: Mutex::new(Some(LaunchBundle {
                messages,
                quit,
                callback,
                on_uncaught,
            })),
            join: Mutex::new(None),
        }
    }

    /// The worker thread's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the named worker thread running the message loop.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Spawn`] if the OS refuses the thread;
    /// - an error if the handle was already launched (the launch bundle is
    ///   consumed on first use).
    pub fn launch(&self) -> Result<()> {
        let bundle = self.bundle.lock().take().ok_or_else(|| {
            LifecycleError::other(format!(
                "worker thread '{}' was already launched",
                self.name
            ))
        })?;

        let thread_name = self.name.clone();
        let control = Arc::clone(&self.control);
        let join = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_loop(thread_name, bundle, control))
            .map_err(|e| {
                LifecycleError::spawn_with_source(self.name.as_str(), "cannot create thread", e)
            })?;

        self.control.mark_active();
        *self.join.lock() = Some(join);
        Ok(())
    }

    /// `true` between a successful launch and message-loop exit.
    pub fn loop_active(&self) -> bool {
        self.control.is_active()
    }

    /// Request cooperative loop termination: raise the quit flag, then wake
    /// the loop if it is parked on an empty queue. Does not join.
    pub fn request_quit(&self) {
        self.control.request_quit();
    }

    /// `true` once the worker thread has fully exited (or never launched).
    pub fn is_finished(&self) -> bool {
        self.join
            .lock()
            .as_ref()
            .map(|join| join.is_finished())
            .unwrap_or(true)
    }
}

impl<M> Drop for WorkerHandle<M> {
    fn drop(&mut self) {
        // Fire-and-forget shutdown: the loop unwinds on its own schedule.
        if self.control.is_active() {
            self.control.request_quit();
        }
    }
}

/// The message loop: block on the queue, run the callback per message in
/// FIFO order, exit when termination is requested or every dispatcher is
/// gone. Messages still queued at termination are dropped, not drained.
fn run_loop<M>(name: String, bundle: LaunchBundle<M>, control: Arc<LoopControl>) {
    let LaunchBundle {
        messages,
        quit,
        callback,
        on_uncaught,
    } = bundle;

    debug!("worker thread '{}': message loop started", name);

    loop {
        // The flag covers messages that raced ahead of the wake signal.
        if control.is_quitting() {
            break;
        }
        select! {
            recv(messages) -> msg => match msg {
                Ok(message) => deliver(&name, message, callback.as_ref(), on_uncaught.as_ref()),
                Err(_) => break, // every dispatcher dropped
            },
            recv(quit) -> _ => break,
        }
    }

    control.mark_stopped();
    debug!("worker thread '{}': message loop exited", name);
}

/// Execute one message with panic protection. A failing or panicking
/// callback is routed to the uncaught handler; the loop keeps running.
fn deliver<M>(
    name: &str,
    message: M,
    callback: &(dyn Fn(M) -> Result<()> + Send + Sync),
    on_uncaught: &(dyn Fn(LifecycleError) + Send + Sync),
) {
    match catch_unwind(AssertUnwindSafe(|| callback(message))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!("worker thread '{}': message failed: {}", name, err);
            on_uncaught(err);
        }
        Err(panic) => {
            let message = panic_message(panic);
            error!("worker thread '{}': message panicked: {}", name, message);
            on_uncaught(LifecycleError::worker_panic(name, message));
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
