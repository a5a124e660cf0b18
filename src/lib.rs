//! # peerhub
//!
//! **Peerhub** is a per-connection message-distribution core for Rust
//! servers.
//!
//! Each remote peer is represented by an [`Endpoint`] holding a bounded
//! outbound mailbox and a mutable stack of message handlers; a [`Registry`]
//! fans events and messages out to every live endpoint. The crate is
//! designed as the hub between a transport (socket read/write loops) and
//! application protocol logic — the transport and codec stay outside.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                         ┌─────────────────────────────────────────────┐
//!   register(ctx) ──────► │  Registry (live set, slot arena)            │
//!                         │  - dispatch_all: event.clone() per endpoint │
//!                         │  - send_all: prune on failed send           │
//!                         │  - Observe: register/prune/dispatch notices │
//!                         └──────┬──────────────┬──────────────┬────────┘
//!                                ▼              ▼              ▼
//!                         ┌──────────┐   ┌──────────┐   ┌──────────┐
//!                         │ Endpoint │   │ Endpoint │   │ Endpoint │
//!                         │ per peer │   │ per peer │   │ per peer │
//!                         └┬────────┬┘   └──────────┘   └──────────┘
//!                          │        │
//!            handler stack │        │ bounded mailbox (cap 10)
//!                          ▼        ▼
//!                   ┌────────┐   send(msg) ──► [■ ■ ■ □ □] ──► recv().await
//!        top ────►  │ auth   │                     │
//!                   │ lobby  │                     └─ full? drop + close +
//!        base ───►  │ fallbk │                        Err(Overflow)
//!                   └────────┘
//!                    dispatch(event): top-down until stop/Err
//!                    handle(msg): top only, explicit passthrough
//! ```
//!
//! ### Lifecycle
//! ```text
//! Registry::register(ctx) ──► Endpoint (open, base handler installed)
//!
//! transport read loop:                       transport write loop:
//!   decode ─► endpoint.handle(msg)             endpoint.recv().await
//!          └► endpoint.dispatch(event)           ├─ Some(msg) ─► serialize
//!   log returned errors, keep reading            └─ None ─► exit (closed)
//!   on peer disconnect ─► endpoint.close()
//!
//! close paths (terminal, one-way):
//!   - mailbox overflow during any send
//!   - transport teardown calls close()
//!   - explicit shutdown
//! after close: sends fail, recv drains then yields None,
//!              next send_all broadcast prunes the registry slot
//! ```
//!
//! ## Features
//! | Area           | Description                                              | Key types / traits            |
//! |----------------|----------------------------------------------------------|-------------------------------|
//! | **Endpoints**  | Bounded non-blocking mailbox, drop-and-disconnect policy.| [`Endpoint`], [`SendError`]   |
//! | **Handlers**   | Stack-based protocol state with two dispatch disciplines.| [`Handler`], [`Fallback`]     |
//! | **Reentrancy** | Self-removal and passthrough via per-call contexts.      | [`EventCx`], [`MessageCx`]    |
//! | **Events**     | Tagged, stoppable, cloned per recipient.                 | [`Event`]                     |
//! | **Broadcast**  | Fan-out with isolation and failure-driven pruning.       | [`Registry`], [`SlotId`]      |
//! | **Observability** | Injected notice sink for connect/disconnect/errors.   | [`Observe`], [`Notice`]       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use peerhub::{DispatchError, Event, EventCx, Handler, MessageCx, Registry};
//!
//! /// Forwards whatever arrives back out through the mailbox.
//! struct Echo;
//!
//! #[async_trait]
//! impl Handler<(), String> for Echo {
//!     async fn on_event(
//!         &self,
//!         cx: &mut EventCx<'_, (), String>,
//!         event: &mut Event<String>,
//!     ) -> Result<(), DispatchError> {
//!         cx.endpoint().send(event.value.clone())?;
//!         Ok(())
//!     }
//!
//!     async fn on_message(
//!         &self,
//!         cx: &mut MessageCx<'_, (), String>,
//!         msg: &String,
//!     ) -> Result<(), DispatchError> {
//!         cx.endpoint().send(msg.clone())?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut registry: Registry<(), String> = Registry::new();
//!
//!     let endpoint = registry.register(());
//!     endpoint.push_handler(Arc::new(Echo));
//!
//!     // Broadcast one event; every endpoint gets its own copy.
//!     registry
//!         .dispatch_all(&Event::new("chat", String::from("hello")))
//!         .await;
//!
//!     // The write loop drains the mailbox.
//!     assert_eq!(endpoint.recv().await.as_deref(), Some("hello"));
//! }
//! ```

mod config;
mod endpoint;
mod error;
mod events;
mod observers;
mod registry;

// ---- Public re-exports ----

pub use config::Config;
pub use endpoint::{Endpoint, EventCx, Fallback, Handler, MessageCx};
pub use error::{DispatchError, SendError};
pub use events::Event;
pub use observers::{Notice, NoticeKind, Observe};
pub use registry::{Registry, RegistryBuilder, SlotId};

// Optional: expose a simple built-in notice printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
