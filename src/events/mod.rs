//! Propagating events and their delivery semantics.
//!
//! This module groups the event **data model** used by chain dispatch: a
//! tagged, stoppable unit of information delivered through an endpoint's
//! handler stack, and cloned per recipient when broadcast by the
//! [`Registry`](crate::Registry).
//!
//! ## Contents
//! - [`Event`] — type tag, opaque payload, stoppable-propagation flag.
//!
//! ## Quick reference
//! - **Producers**: inbound transport loops and application code.
//! - **Consumers**: [`Handler::on_event`](crate::Handler::on_event) via
//!   [`Endpoint::dispatch`](crate::Endpoint::dispatch) and
//!   [`Registry::dispatch_all`](crate::Registry::dispatch_all).

mod event;

pub use event::Event;
