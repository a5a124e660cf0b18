//! # The live-endpoint registry and its slot arena.
//!
//! ## Contents
//! - [`Registry`] — membership plus broadcast dispatch/send with
//!   failure-driven pruning.
//! - [`RegistryBuilder`] — construction with an optional observer.
//! - [`SlotId`] — stable identifier of a registry slot; survives pruning of
//!   other slots.
//!
//! ## Quick reference
//! - **Joining**: `register` / `register_with_base` at connection
//!   establishment.
//! - **Leaving**: only as a side effect of a failed `send_all` delivery.
//! - **Fan-out**: `dispatch_all` clones the event per endpoint;
//!   `send_all` clones the message per endpoint.

mod arena;
mod builder;
#[allow(clippy::module_inception)]
mod registry;

pub use arena::SlotId;
pub use builder::RegistryBuilder;
pub use registry::Registry;
