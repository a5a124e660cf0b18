//! # Live-endpoint registry: membership and broadcast fan-out.
//!
//! The [`Registry`] owns the set of live endpoints for a server. It creates
//! endpoints at connection establishment, fans events and messages out to
//! all of them, and prunes members whose sends fail.
//!
//! ## Architecture
//! ```text
//! register(ctx) ──► [slot 0] Endpoint ──► returned handle to the transport
//!                   [slot 1] Endpoint
//!                   [slot 2] (free)        ◄─ reclaimed by pruning
//!                   [slot 3] Endpoint
//!
//! dispatch_all(event) ─► event.clone() per live slot ─► endpoint.dispatch()
//!                        failures reported to the observer, never returned
//!
//! send_all(msg) ───────► msg.clone() per live slot ───► endpoint.send()
//!                        failure ─► slot vacated + Notice::Pruned
//! ```
//!
//! ## Rules
//! - Registration adds members; only failed broadcast sends remove them.
//! - Per-endpoint failures are isolated: one endpoint's error or stop never
//!   affects delivery to the others, and the broadcast caller sees no error.
//! - The registry is owned by a single broadcaster context; it provides no
//!   internal locking (mutating operations take `&mut self`).

use std::sync::Arc;

use crate::config::Config;
use crate::endpoint::{Endpoint, Handler};
use crate::events::Event;
use crate::observers::{Notice, NoticeKind, Observe};
use crate::registry::arena::Arena;
use crate::registry::builder::RegistryBuilder;
use crate::registry::SlotId;

/// Unordered collection of live endpoints with broadcast delivery.
///
/// Slot identity is stable: pruning one endpoint never moves another, and a
/// [`SlotId`] observed in a notice stays valid until that slot is pruned.
pub struct Registry<C, M> {
    arena: Arena<Endpoint<C, M>>,
    cfg: Config,
    observer: Option<Arc<dyn Observe>>,
}

impl<C, M> Registry<C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// Creates an empty registry with default [`Config`] and no observer.
    #[must_use]
    pub fn new() -> Self {
        Self::builder(Config::default()).build()
    }

    /// Returns a builder for a registry with the given configuration.
    #[must_use]
    pub fn builder(cfg: Config) -> RegistryBuilder<C, M> {
        RegistryBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, observer: Option<Arc<dyn Observe>>) -> Self {
        Self {
            arena: Arena::new(),
            cfg,
            observer,
        }
    }

    /// Creates an endpoint for a new connection, adds it to the live set,
    /// and returns it.
    ///
    /// The endpoint uses the registry's [`Config`] and the default
    /// [`Fallback`](crate::Fallback) base handler.
    pub fn register(&mut self, context: C) -> Endpoint<C, M> {
        let endpoint = Endpoint::with_config(context, &self.cfg);
        self.admit(endpoint)
    }

    /// Like [`register`](Registry::register), with a caller-supplied base
    /// handler defining the connection's default behavior.
    pub fn register_with_base(
        &mut self,
        context: C,
        base: Arc<dyn Handler<C, M>>,
    ) -> Endpoint<C, M> {
        let endpoint = Endpoint::with_base(context, base, &self.cfg);
        self.admit(endpoint)
    }

    fn admit(&mut self, endpoint: Endpoint<C, M>) -> Endpoint<C, M> {
        let slot = self.arena.insert(endpoint.clone());
        self.notify(Notice::now(NoticeKind::Registered).with_slot(slot));
        endpoint
    }

    /// Returns the endpoint at `slot`, if still registered.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Endpoint<C, M>> {
        self.arena.get(slot)
    }

    /// Iterates the live set in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Endpoint<C, M>)> {
        self.arena.iter()
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true when no endpoints are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Delivers an independent copy of `event` to every live endpoint via
    /// chain dispatch.
    ///
    /// Each endpoint receives its own clone, so one recipient stopping
    /// propagation (or mutating its copy) cannot affect another's dispatch.
    /// Per-endpoint failures are reported to the observer as
    /// [`NoticeKind::DispatchFailed`] and never surfaced to the caller; a
    /// dispatch failure alone does not remove the endpoint.
    pub async fn dispatch_all(&self, event: &Event<M>)
    where
        M: Clone,
    {
        for (slot, endpoint) in self.arena.iter() {
            let mut copy = event.clone();
            if let Err(err) = endpoint.dispatch(&mut copy).await {
                self.notify(
                    Notice::now(NoticeKind::DispatchFailed)
                        .with_slot(slot)
                        .with_error(err.to_string()),
                );
            }
        }
    }

    /// Attempts `send` on every live endpoint, pruning the ones that fail.
    ///
    /// An endpoint whose send fails — already closed, or overflowed on this
    /// very send — is removed from the live set and reported as
    /// [`NoticeKind::Pruned`]. Nothing is returned to the caller: a dead
    /// peer is the registry's problem, not the broadcaster's.
    pub fn send_all(&mut self, msg: &M)
    where
        M: Clone,
    {
        let observer = self.observer.clone();
        self.arena.retain(|slot, endpoint| {
            match endpoint.send(msg.clone()) {
                Ok(()) => true,
                Err(err) => {
                    if let Some(observer) = &observer {
                        observer.notice(
                            &Notice::now(NoticeKind::Pruned)
                                .with_slot(slot)
                                .with_error(err.as_label()),
                        );
                    }
                    false
                }
            }
        });
    }

    fn notify(&self, notice: Notice) {
        if let Some(observer) = &self.observer {
            observer.notice(&notice);
        }
    }
}

impl<C, M> Default for Registry<C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
