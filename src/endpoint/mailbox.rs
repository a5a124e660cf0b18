//! # Bounded, non-blocking outbound mailbox.
//!
//! One mailbox per endpoint: many producers enqueue with `try_send`, exactly
//! one consumer (the transport's write loop) drains. The queue never blocks a
//! producer — an enqueue either succeeds immediately or fails immediately.
//! This is the core backpressure decision: bounded queue plus
//! drop-and-disconnect keeps a broadcaster's cost per slow peer O(1) instead
//! of O(blocked time).
//!
//! ## Rules
//! - Overflow is reported to the caller; closing the endpoint in response is
//!   the endpoint's job, not the mailbox's.
//! - Closed is a one-way transition carried by a [`CancellationToken`].
//! - After close, [`Mailbox::pull`] drains whatever was already buffered and
//!   then returns `None` immediately, forever.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;

/// Bounded FIFO between message producers and a single consumer.
pub(crate) struct Mailbox<M> {
    tx: mpsc::Sender<M>,
    rx: Mutex<mpsc::Receiver<M>>,
    closed: CancellationToken,
}

impl<M> Mailbox<M> {
    /// Creates a mailbox with the given capacity (clamped to a minimum of 1).
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
            closed: CancellationToken::new(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        !self.closed.is_cancelled()
    }

    /// Returns the close token; cancelled exactly when the mailbox closes.
    pub(crate) fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Non-blocking enqueue.
    ///
    /// Fails with [`SendError::Closed`] after close and
    /// [`SendError::Overflow`] when the queue is at capacity. The message is
    /// dropped in both cases.
    pub(crate) fn push(&self, msg: M) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::Closed);
        }
        match self.tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SendError::Overflow),
            Err(TrySendError::Closed(_)) => Err(SendError::Closed),
        }
    }

    /// Closes the mailbox. Idempotent; never reopens.
    pub(crate) fn close(&self) {
        self.closed.cancel();
    }

    /// Awaits the next buffered item.
    ///
    /// Intended for exactly one consumer. Once the mailbox is closed,
    /// returns the remaining buffered items and then `None` without
    /// blocking.
    pub(crate) async fn pull(&self) -> Option<M> {
        let mut rx = self.rx.lock().await;
        loop {
            if self.closed.is_cancelled() {
                return rx.try_recv().ok();
            }
            tokio::select! {
                msg = rx.recv() => return msg,
                _ = self.closed.cancelled() => {}
            }
        }
    }
}
