//! The dispatch handle: a cloneable capability to enqueue messages for one
//! message-loop epoch.

use crate::core::LifecycleError;
use crate::worker::control::LoopControl;
use crossbeam_channel::Sender;
use std::sync::Arc;

/// Error returned when a message could not be dispatched because its loop
/// has been asked to quit or has exited.
///
/// The undelivered message is handed back so the caller can retry against a
/// fresh dispatcher or handle it some other way.
pub struct DispatchError<M> {
    message: M,
}

impl<M> DispatchError<M> {
    /// Recover the message that could not be delivered.
    pub fn into_message(self) -> M {
        self.message
    }
}

impl<M> std::fmt::Debug for DispatchError<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchError").finish_non_exhaustive()
    }
}

impl<M> std::fmt::Display for DispatchError<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "message loop is stopped")
    }
}

impl<M> std::error::Error for DispatchError<M> {}

impl<M> From<DispatchError<M>> for LifecycleError {
    fn from(_: DispatchError<M>) -> Self {
        LifecycleError::LoopStopped
    }
}

/// An opaque capability to enqueue messages on one worker's message loop.
///
/// Messages are delivered strictly in enqueue order and executed one at a
/// time on the worker thread. A dispatcher is bound to the loop epoch it was
/// created for: every [`WorkerLifecycle::start`] builds a fresh channel, so
/// a dispatcher kept across a stop/start cycle fails instead of silently
/// reaching the new worker.
///
/// Dispatchers are cheap to clone; all clones feed the same loop.
///
/// [`WorkerLifecycle::start`]: crate::worker::WorkerLifecycle::start
pub struct Dispatcher<M> {
    sender: Sender<M>,
    control: Arc<LoopControl>,
}

impl<M: Send> Dispatcher<M> {
    pub(crate) fn new(sender: Sender<M>, control: Arc<LoopControl>) -> Self {
        Self { sender, control }
    }

    /// Enqueue `message` for sequential execution on the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] carrying the message back if the loop has
    /// been asked to quit or has already exited.
    pub fn dispatch(&self, message: M) -> Result<(), DispatchError<M>> {
        if self.control.is_quitting() {
            return Err(DispatchError { message });
        }
        self.sender.send(message).map_err(|err| DispatchError {
            message: err.into_inner(),
        })
    }

    /// `true` while the loop this dispatcher is bound to accepts messages.
    pub fn is_connected(&self) -> bool {
        !self.control.is_quitting() && self.control.is_active()
    }
}

impl<M> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            control: Arc::clone(&self.control),
        }
    }
}

impl<M> std::fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("control", &self.control)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dispatcher() -> (Dispatcher<&'static str>, crossbeam_channel::Receiver<&'static str>) {
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded();
        let (quit_tx, _quit_rx) = crossbeam_channel::bounded(1);
        let control = Arc::new(LoopControl::new(quit_tx));
        control.mark_active();
        (Dispatcher::new(msg_tx, control), msg_rx)
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let (dispatcher, rx) = test_dispatcher();

        dispatcher.dispatch("a").unwrap();
        dispatcher.dispatch("b").unwrap();
        dispatcher.dispatch("c").unwrap();

        assert_eq!(rx.try_recv().unwrap(), "a");
        assert_eq!(rx.try_recv().unwrap(), "b");
        assert_eq!(rx.try_recv().unwrap(), "c");
    }

    #[test]
    fn test_dispatch_after_quit_returns_message() {
        let (dispatcher, _rx) = test_dispatcher();
        assert!(dispatcher.is_connected());

        dispatcher.control.request_quit();
        assert!(!dispatcher.is_connected());

        let err = dispatcher.dispatch("lost").unwrap_err();
        assert_eq!(err.into_message(), "lost");
    }

    #[test]
    fn test_dispatch_after_receiver_dropped() {
        let (dispatcher, rx) = test_dispatcher();
        drop(rx);

        let err = dispatcher.dispatch("lost").unwrap_err();
        assert_eq!(err.to_string(), "message loop is stopped");
        assert_eq!(err.into_message(), "lost");
    }

    #[test]
    fn test_clones_feed_the_same_channel() {
        let (dispatcher, rx) = test_dispatcher();
        let clone = dispatcher.clone();

        dispatcher.dispatch("from original").unwrap();
        clone.dispatch("from clone").unwrap();

        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_error_converts_to_lifecycle_error() {
        let (dispatcher, _rx) = test_dispatcher();
        dispatcher.control.request_quit();

        let err: LifecycleError = dispatcher.dispatch("x").unwrap_err().into();
        assert!(matches!(err, LifecycleError::LoopStopped));
    }
}
