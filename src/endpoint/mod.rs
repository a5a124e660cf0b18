//! # Per-connection endpoints and their handler stacks.
//!
//! This module groups the per-connection machinery:
//!
//! ## Contents
//! - [`Endpoint`] — owner context, bounded outbound mailbox, handler stack.
//! - [`Handler`] — the message-handler trait, with [`Fallback`] as the
//!   always-present base.
//! - [`EventCx`] / [`MessageCx`] — per-invocation call contexts carrying the
//!   executing stack position (self-removal, passthrough).
//! - `Mailbox` — internal bounded FIFO behind `send`/`recv`.
//!
//! ## Quick reference
//! - **Outbound**: anyone may `send`; exactly one write loop calls `recv`.
//! - **Inbound**: one loop per endpoint drives `dispatch`/`handle` and stack
//!   mutation.
//! - **Eviction**: a full mailbox closes the endpoint on the spot.

mod endpoint;
mod handler;
mod mailbox;

pub use endpoint::Endpoint;
pub use handler::{EventCx, Fallback, Handler, MessageCx};
