//! # Message handlers and their per-invocation call contexts.
//!
//! A connection's protocol state is represented as "what handles the next
//! message": a stack of [`Handler`]s on each endpoint, mutated with
//! push/pop/replace as the protocol moves between states (for example,
//! entering and leaving an authenticated sub-protocol).
//!
//! ## Two dispatch disciplines, one stack
//! ```text
//! chain dispatch (Endpoint::dispatch)        single-active (Endpoint::handle)
//!
//!   [ top    ] ◄─ invoked 1st                  [ top    ] ◄─ invoked (only)
//!   [ middle ] ◄─ invoked 2nd                  [ middle ] ◄─ via passthrough
//!   [ base   ] ◄─ invoked last                 [ base   ]
//!
//!   stops on first Err or once the             delegation is explicit:
//!   event is stopped                           MessageCx::passthrough(msg)
//! ```
//!
//! ## Call contexts
//! The executing stack position travels in a context value created per
//! invocation — [`EventCx`] for chain dispatch, [`MessageCx`] for
//! single-active dispatch — so reentrant operations (self-removal,
//! passthrough) need no shared mutable position field on the endpoint, and
//! "called outside an active invocation" is unrepresentable.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use peerhub::{DispatchError, Event, EventCx, Handler};
//!
//! struct Ceiling;
//!
//! #[async_trait]
//! impl Handler<(), u64> for Ceiling {
//!     async fn on_event(
//!         &self,
//!         _cx: &mut EventCx<'_, (), u64>,
//!         event: &mut Event<u64>,
//!     ) -> Result<(), DispatchError> {
//!         if event.value > 9000 {
//!             event.stop_propagation();
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::DispatchError;
use crate::events::Event;

/// A message handler installed on an endpoint's stack.
///
/// Both hooks have defaults so a handler may participate in only one
/// discipline:
/// - [`on_event`](Handler::on_event) defaults to accepting the event;
/// - [`on_message`](Handler::on_message) defaults to
///   [`DispatchError::Unhandled`].
///
/// Handlers are shared (`Arc`) and invoked through `&self`; stateful handlers
/// use interior mutability. Dispatch on a given endpoint is serialized by its
/// owning inbound loop, so handler state sees invocations in order.
#[async_trait]
pub trait Handler<C, M>: Send + Sync
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// Chain-dispatch hook, invoked top-down by
    /// [`Endpoint::dispatch`](crate::Endpoint::dispatch).
    ///
    /// Returning `Err` halts the chain and surfaces the error to the
    /// dispatching caller; calling [`Event::stop_propagation`] halts the
    /// chain quietly after this invocation.
    async fn on_event(
        &self,
        cx: &mut EventCx<'_, C, M>,
        event: &mut Event<M>,
    ) -> Result<(), DispatchError> {
        let _ = (cx, event);
        Ok(())
    }

    /// Single-active hook, invoked on the top handler only by
    /// [`Endpoint::handle`](crate::Endpoint::handle).
    ///
    /// Delegate explicitly with [`MessageCx::passthrough`] to fall back to
    /// the handler beneath without popping it.
    async fn on_message(
        &self,
        cx: &mut MessageCx<'_, C, M>,
        msg: &M,
    ) -> Result<(), DispatchError> {
        let _ = (cx, msg);
        Err(DispatchError::Unhandled)
    }
}

/// The base handler installed at the bottom of every stack by default.
///
/// Accepts every event and reports every message as unhandled, which keeps
/// the stack non-empty for the lifetime of the endpoint (the base cannot be
/// popped or removed).
pub struct Fallback;

impl<C, M> Handler<C, M> for Fallback
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
}

/// Call context for one chain-dispatch invocation.
///
/// Created by [`Endpoint::dispatch`](crate::Endpoint::dispatch) for each
/// handler it invokes; carries the executing stack position.
pub struct EventCx<'a, C, M> {
    endpoint: &'a Endpoint<C, M>,
    position: usize,
    removed: bool,
}

impl<'a, C, M> EventCx<'a, C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    pub(crate) fn new(endpoint: &'a Endpoint<C, M>, position: usize) -> Self {
        Self {
            endpoint,
            position,
            removed: false,
        }
    }

    /// The endpoint being dispatched to, for sends and context access.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint<C, M> {
        self.endpoint
    }

    /// Removes the stack slot currently executing.
    ///
    /// Exactly that slot is removed; positions above and below are
    /// undisturbed, and the remainder of the chain proceeds beneath as if
    /// this handler had never been installed.
    ///
    /// # Panics
    /// Panics if the executing slot is the base handler, or if called twice
    /// within one invocation — both would corrupt the stack.
    pub fn remove_handler(&mut self) {
        assert!(
            !self.removed,
            "handler slot already removed during this invocation"
        );
        self.endpoint.remove_at(self.position);
        self.removed = true;
    }
}

/// Call context for one single-active invocation.
///
/// Created by [`Endpoint::handle`](crate::Endpoint::handle) (and by
/// [`passthrough`](MessageCx::passthrough) for the handler beneath); carries
/// the executing stack position.
pub struct MessageCx<'a, C, M> {
    endpoint: &'a Endpoint<C, M>,
    position: usize,
}

impl<'a, C, M> MessageCx<'a, C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    pub(crate) fn new(endpoint: &'a Endpoint<C, M>, position: usize) -> Self {
        Self { endpoint, position }
    }

    /// The endpoint being handled, for sends and context access.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint<C, M> {
        self.endpoint
    }

    /// Delegates to the handler immediately beneath the executing one,
    /// returning that handler's result.
    ///
    /// The handler beneath is invoked in place — nothing is popped — so the
    /// current protocol state survives the fallback.
    ///
    /// Fails with [`DispatchError::Passthrough`] when the executing handler
    /// is already the base (nothing beneath it).
    pub async fn passthrough(&mut self, msg: &M) -> Result<(), DispatchError> {
        if self.position == 0 {
            return Err(DispatchError::Passthrough);
        }
        self.endpoint.invoke(self.position - 1, msg).await
    }
}
