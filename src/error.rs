//! Error types used by the endpoint/registry core.
//!
//! This module defines two main error enums:
//!
//! - [`SendError`] — failures on the outbound mailbox path.
//! - [`DispatchError`] — failures while running the handler stack.
//!
//! Both types provide `as_label` for logging/metrics. Invariant violations
//! (popping the last remaining handler, removing the base handler, removing
//! the same slot twice in one invocation) are programming errors: they panic
//! instead of returning a value, since silently continuing would corrupt the
//! stack.

use thiserror::Error;

/// # Errors produced by the outbound mailbox.
///
/// Returned by [`Endpoint::send`](crate::Endpoint::send) and observed by the
/// registry during [`send_all`](crate::Registry::send_all), where either
/// variant prunes the endpoint from the live set.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SendError {
    /// The endpoint was already closed when the send was attempted.
    ///
    /// Always recoverable: the caller should abandon its reference.
    #[error("endpoint is closed")]
    Closed,

    /// The mailbox was full at send time.
    ///
    /// The endpoint is forcibly closed as a side effect: a consumer that
    /// stopped draining its mailbox is evicted instead of blocking the
    /// broadcaster or growing memory without bound. The message is dropped;
    /// there is no retry path.
    #[error("mailbox full; endpoint closed")]
    Overflow,
}

impl SendError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use peerhub::SendError;
    ///
    /// assert_eq!(SendError::Overflow.as_label(), "send_overflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SendError::Closed => "send_closed",
            SendError::Overflow => "send_overflow",
        }
    }
}

/// # Errors produced by handler-stack dispatch.
///
/// Returned by [`Endpoint::dispatch`](crate::Endpoint::dispatch) and
/// [`Endpoint::handle`](crate::Endpoint::handle) to the inbound loop, which
/// decides whether to keep reading or close the connection. The core never
/// closes an endpoint solely because a handler failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Dispatch was attempted on an already-closed endpoint.
    #[error("endpoint is closed")]
    Closed,

    /// No handler in the stack processed the message.
    ///
    /// This is the base handler's default behavior; recoverable, surfaced to
    /// logging by the caller.
    #[error("no handler processed the message")]
    Unhandled,

    /// Passthrough was requested with nothing beneath the executing handler.
    ///
    /// Indicates a handler-logic bug; recoverable, surfaced to logging.
    #[error("nothing beneath the executing handler to pass through to")]
    Passthrough,

    /// A handler reported its own failure.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl DispatchError {
    /// Wraps a handler-specific failure message.
    pub fn failed(error: impl Into<String>) -> Self {
        DispatchError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use peerhub::DispatchError;
    ///
    /// assert_eq!(DispatchError::Unhandled.as_label(), "dispatch_unhandled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
            DispatchError::Unhandled => "dispatch_unhandled",
            DispatchError::Passthrough => "dispatch_passthrough",
            DispatchError::Failed { .. } => "dispatch_failed",
        }
    }
}

impl From<SendError> for DispatchError {
    /// Lets handlers forward replies with `?`:
    /// a failed send inside a handler is reported as a handler failure.
    fn from(err: SendError) -> Self {
        DispatchError::failed(err.to_string())
    }
}
