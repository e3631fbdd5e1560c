//! Run-wide cancellation shared by workers, the transport and the emitter.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cloneable cancellation handle.
///
/// Cancelling sets a flag and drops the only sender of an internal channel, so every
/// blocked `select!` or `recv_timeout` on [`CancelToken::closed`] wakes immediately.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    closed: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            closed: rx,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        if let Ok(mut trigger) = self.trigger.lock() {
            trigger.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Receiver that becomes disconnected on cancel. Use in `select!`.
    pub fn closed(&self) -> &Receiver<()> {
        &self.closed
    }

    /// Sleep up to `dur`; returns true if cancelled before or during the wait.
    pub fn wait_timeout(&self, dur: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.closed.recv_timeout(dur) {
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
            _ => true,
        }
    }
}
