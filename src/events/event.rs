//! # Stoppable events delivered through handler stacks.
//!
//! An [`Event`] is an immutable-by-convention unit of propagating
//! information: a string type tag, an opaque payload, and a
//! stop-propagation flag read by the chain-dispatch loop.
//!
//! ## Copy semantics
//! `Clone` produces the per-recipient copy: same tag and payload, carrying
//! the *current* stopped flag, independently mutable thereafter. One logical
//! event delivered to many endpoints must never let one recipient's
//! [`stop_propagation`](Event::stop_propagation) affect another recipient's
//! dispatch; [`Registry::dispatch_all`](crate::Registry::dispatch_all) clones
//! per endpoint for exactly this reason.

/// A propagating event with a stoppable-propagation flag.
///
/// The payload type `V` is opaque to the core; applications typically use a
/// closed enum over their message set.
///
/// # Example
/// ```
/// use peerhub::Event;
///
/// let event = Event::new("chat", String::from("hello"));
/// let mut copy = event.clone();
/// copy.stop_propagation();
///
/// assert!(copy.is_stopped());
/// assert!(!event.is_stopped());
/// ```
#[derive(Debug, Clone)]
pub struct Event<V> {
    /// Application-level type tag (e.g. `"chat"`, `"join"`).
    pub kind: String,
    /// Opaque payload; never inspected by the core.
    pub value: V,
    stopped: bool,
}

impl<V> Event<V> {
    /// Creates a new, unstopped event.
    pub fn new(kind: impl Into<String>, value: V) -> Self {
        Self {
            kind: kind.into(),
            value,
            stopped: false,
        }
    }

    /// Marks the event as stopped.
    ///
    /// A chain-dispatch loop that observes a stopped event after invoking a
    /// handler halts further handler invocation for that delivery.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Returns whether propagation has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
