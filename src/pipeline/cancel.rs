//! Cancellation broadcast: a token closed exactly once and observed by every pipeline thread.
//!
//! The token owns the only [`Sender`] of a channel that never carries a message. Closing the
//! token drops that sender, so every `recv` on [`CancelToken::done`] becomes ready at once. That
//! makes the token usable as an arm of `select!` next to any other channel operation.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
}

/// Shared broadcast signal with two states: open and closed. Clones observe the same state.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
    done: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
            }),
            done: rx,
        }
    }

    /// Close the token. Returns true only for the call that actually closed it.
    pub fn cancel(&self) -> bool {
        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match trigger {
            Some(tx) => {
                // Flag first so anyone woken by the disconnect sees it set.
                self.inner.cancelled.store(true, Ordering::SeqCst);
                drop(tx);
                debug!("cancel: token closed");
                true
            }
            None => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the token is closed. Use in `select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.done
    }

    /// Block until the token is closed.
    pub fn wait(&self) {
        let _ = self.done.recv();
    }

    /// Guard that closes this token when dropped.
    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            token: self.clone(),
        }
    }
}

/// Closes its token on drop: the scoped release every run uses so that no thread stays blocked
/// on a peer that has already left.
pub struct CancelGuard {
    token: CancelToken,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
