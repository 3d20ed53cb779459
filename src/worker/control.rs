//! Shared coordination block between a message loop, its dispatchers,
//! and the lifecycle destructor.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative termination state for one message-loop epoch.
///
/// Termination is two signals: a `quitting` flag the loop checks between
/// messages, and a one-shot wake channel that unblocks a loop parked on an
/// empty queue. Dispatchers consult the flag to reject enqueues against a
/// loop that has been asked to quit.
pub(crate) struct LoopControl {
    quitting: AtomicBool,
    active: AtomicBool,
    waker: Sender<()>,
}

impl LoopControl {
    pub(crate) fn new(waker: Sender<()>) -> Self {
        Self {
            quitting: AtomicBool::new(false),
            active: AtomicBool::new(false),
            waker,
        }
    }

    /// Request cooperative termination: raise the flag, then wake the loop.
    ///
    /// Idempotent; only the first call sends the wake signal.
    pub(crate) fn request_quit(&self) {
        if self.quitting.swap(true, Ordering::SeqCst) {
            return;
        }
        // The loop may already have exited and dropped its receiver.
        let _ = self.waker.try_send(());
    }

    #[inline]
    pub(crate) fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::Acquire)
    }

    /// `true` between a successful launch and loop exit.
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn mark_active(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn mark_stopped(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for LoopControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopControl")
            .field("quitting", &self.is_quitting())
            .field("active", &self.is_active())
            .finish()
    }
}
