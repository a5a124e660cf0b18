//! # Per-connection endpoint: bounded mailbox plus handler stack.
//!
//! One [`Endpoint`] per remote peer. Producers (broadcasts, direct replies)
//! call [`send`](Endpoint::send); the transport's write loop drains with
//! [`recv`](Endpoint::recv); the transport's read loop drives
//! [`dispatch`](Endpoint::dispatch) / [`handle`](Endpoint::handle) against
//! the handler stack.
//!
//! ## Wiring
//! ```text
//! producers ── send(msg) ──► [bounded mailbox] ──► recv().await ──► write loop
//!                                  │
//!                                  └─ full? drop msg, close endpoint,
//!                                     Err(SendError::Overflow)
//!
//! read loop ── dispatch(event) ──► handler stack, top-down, until stop/Err
//!          └── handle(msg) ──────► top handler only (explicit passthrough)
//! ```
//!
//! ## Rules
//! - `send` never blocks: it enqueues immediately or fails immediately.
//! - Overflow forcibly closes the endpoint (stack cleared, mailbox closed):
//!   an unresponsive consumer is evicted, not waited on.
//! - Closed is terminal. Mailbox operations fail afterwards; the stack
//!   becomes inert; a blocked `recv` unblocks with `None` after draining.
//! - A base handler exists from construction and can never be popped or
//!   removed, so the stack is non-empty for the endpoint's open lifetime.
//! - Dispatch, handle, and stack mutation must be serialized per endpoint
//!   (typically driven solely by that endpoint's inbound loop); `send` and
//!   `recv` may run concurrently with them.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::endpoint::handler::{EventCx, Fallback, Handler, MessageCx};
use crate::endpoint::mailbox::Mailbox;
use crate::error::{DispatchError, SendError};
use crate::events::Event;

type Stack<C, M> = Vec<Arc<dyn Handler<C, M>>>;

struct Inner<C, M> {
    context: C,
    mailbox: Mailbox<M>,
    handlers: Mutex<Stack<C, M>>,
}

/// Per-connection interface: owner context, bounded outbound mailbox, and a
/// mutable stack of message handlers.
///
/// `Endpoint` is a cheap clonable handle; clones share the same connection
/// state. The registry keeps one handle per registered endpoint and returns
/// another to the caller.
pub struct Endpoint<C, M> {
    inner: Arc<Inner<C, M>>,
}

impl<C, M> Clone for Endpoint<C, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, M> fmt::Debug for Endpoint<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("open", &self.inner.mailbox.is_open())
            .finish_non_exhaustive()
    }
}

impl<C, M> Endpoint<C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// Creates an open endpoint with default [`Config`] and the [`Fallback`]
    /// base handler.
    pub fn new(context: C) -> Self {
        Self::with_config(context, &Config::default())
    }

    /// Creates an open endpoint with the given configuration and the
    /// [`Fallback`] base handler.
    pub fn with_config(context: C, cfg: &Config) -> Self {
        Self::with_base(context, Arc::new(Fallback), cfg)
    }

    /// Creates an open endpoint with a caller-supplied base handler.
    ///
    /// The base sits at the bottom of the stack for the endpoint's lifetime;
    /// it defines the default behavior when nothing above it handles a
    /// message.
    pub fn with_base(context: C, base: Arc<dyn Handler<C, M>>, cfg: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                context,
                mailbox: Mailbox::new(cfg.mailbox_capacity_clamped()),
                handlers: Mutex::new(vec![base]),
            }),
        }
    }

    /// The owner-supplied connection context.
    #[must_use]
    pub fn context(&self) -> &C {
        &self.inner.context
    }

    /// Whether the endpoint is still open. Once false, never true again.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.mailbox.is_open()
    }

    /// Returns a token cancelled exactly when this endpoint closes.
    ///
    /// Transports use it to tear down read/write loops without polling.
    #[must_use]
    pub fn closed(&self) -> CancellationToken {
        self.inner.mailbox.closed_token()
    }

    /// Current handler-stack depth (0 once closed).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack().len()
    }

    // The stack mutex is never held across handler invocations or awaits, so
    // a poisoned lock only means a panic mid-mutation; recover the guard.
    fn stack(&self) -> MutexGuard<'_, Stack<C, M>> {
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ---- mailbox ----

    /// Enqueues a message for the connection's write loop. Never blocks.
    ///
    /// Fails with [`SendError::Closed`] on a closed endpoint. If the mailbox
    /// is at capacity the message is dropped, the endpoint is **forcibly
    /// closed**, and the send fails with [`SendError::Overflow`] — callers
    /// holding a reference (typically the registry) should drop it.
    pub fn send(&self, msg: M) -> Result<(), SendError> {
        match self.inner.mailbox.push(msg) {
            Err(SendError::Overflow) => {
                self.close();
                Err(SendError::Overflow)
            }
            other => other,
        }
    }

    /// Receives the next outbound message, waiting until one is available.
    ///
    /// Intended for exactly one consumer per endpoint (the write loop). Once
    /// the endpoint is closed and the mailbox drained, returns `None`
    /// immediately instead of blocking forever.
    pub async fn recv(&self) -> Option<M> {
        self.inner.mailbox.pull().await
    }

    /// Closes the endpoint: clears the handler stack, closes the mailbox so
    /// any blocked [`recv`](Endpoint::recv) unblocks, and cancels the
    /// [`closed`](Endpoint::closed) token. Safe to call more than once.
    ///
    /// Remaining handlers are not notified; watch the token instead.
    pub fn close(&self) {
        self.inner.mailbox.close();
        self.stack().clear();
    }

    // ---- handler stack ----

    /// Pushes a handler as the new top of the stack.
    ///
    /// No-op on a closed endpoint.
    pub fn push_handler(&self, handler: Arc<dyn Handler<C, M>>) {
        let mut stack = self.stack();
        if !self.is_open() {
            return;
        }
        stack.push(handler);
    }

    /// Pops the current top of the stack.
    ///
    /// No-op on a closed endpoint.
    ///
    /// # Panics
    /// Panics if only the base handler remains: the base must never be
    /// removable, and popping it is a programmer error rather than a
    /// recoverable condition.
    pub fn pop_handler(&self) {
        let mut stack = self.stack();
        if !self.is_open() {
            return;
        }
        assert!(stack.len() > 1, "cannot pop the base handler");
        stack.pop();
    }

    /// Swaps the current top of the stack for `handler` without changing the
    /// stack depth.
    ///
    /// No-op on a closed endpoint.
    pub fn replace_handler(&self, handler: Arc<dyn Handler<C, M>>) {
        let mut stack = self.stack();
        if !self.is_open() {
            return;
        }
        let top = stack.len() - 1;
        stack[top] = handler;
    }

    // Removes the slot at `position` on behalf of the executing handler.
    pub(crate) fn remove_at(&self, position: usize) {
        let mut stack = self.stack();
        if !self.is_open() {
            return;
        }
        assert!(position > 0, "cannot remove the base handler");
        if position < stack.len() {
            stack.remove(position);
        }
    }

    // ---- dispatch ----

    /// Chain dispatch: invokes handlers top-down (most recently pushed
    /// first) until one returns an error or the event is stopped.
    ///
    /// For a stack `[base, h1, h2]` the net order is h2, h1, base. A handler
    /// may remove its own slot mid-chain via
    /// [`EventCx::remove_handler`](crate::EventCx::remove_handler); the
    /// remainder of the chain is unaffected.
    pub async fn dispatch(&self, event: &mut Event<M>) -> Result<(), DispatchError> {
        if !self.is_open() {
            return Err(DispatchError::Closed);
        }
        let mut position = self.stack().len();
        while position > 0 {
            position -= 1;
            let handler = {
                let stack = self.stack();
                match stack.get(position) {
                    Some(handler) => Arc::clone(handler),
                    // Stack shrank beneath the cursor (self-removal above);
                    // fall through to the next live slot.
                    None => continue,
                }
            };
            let mut cx = EventCx::new(self, position);
            handler.on_event(&mut cx, event).await?;
            if event.is_stopped() {
                break;
            }
        }
        Ok(())
    }

    /// Single-active dispatch: invokes only the topmost handler.
    ///
    /// The handler may delegate explicitly to the one beneath it with
    /// [`MessageCx::passthrough`](crate::MessageCx::passthrough). A fresh
    /// endpoint (base only) reports [`DispatchError::Unhandled`].
    pub async fn handle(&self, msg: &M) -> Result<(), DispatchError> {
        if !self.is_open() {
            return Err(DispatchError::Closed);
        }
        let top = match self.stack().len().checked_sub(1) {
            Some(top) => top,
            None => return Err(DispatchError::Closed),
        };
        self.invoke(top, msg).await
    }

    // Invokes the single-active hook at `position`; also the passthrough
    // entry point.
    pub(crate) async fn invoke(&self, position: usize, msg: &M) -> Result<(), DispatchError> {
        let handler = {
            let stack = self.stack();
            match stack.get(position) {
                Some(handler) => Arc::clone(handler),
                None => return Err(DispatchError::Closed),
            }
        };
        let mut cx = MessageCx::new(self, position);
        handler.on_message(&mut cx, msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn taken(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    /// Chain-dispatch probe with configurable side effects.
    struct Tracer {
        name: &'static str,
        log: Log,
        stop: bool,
        fail: bool,
        remove_self: bool,
    }

    impl Tracer {
        fn passive(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Arc::clone(log),
                stop: false,
                fail: false,
                remove_self: false,
            }
        }

        fn stopper(name: &'static str, log: &Log) -> Self {
            Self {
                stop: true,
                ..Self::passive(name, log)
            }
        }

        fn failing(name: &'static str, log: &Log) -> Self {
            Self {
                fail: true,
                ..Self::passive(name, log)
            }
        }

        fn vanishing(name: &'static str, log: &Log) -> Self {
            Self {
                remove_self: true,
                ..Self::passive(name, log)
            }
        }
    }

    #[async_trait]
    impl Handler<(), u32> for Tracer {
        async fn on_event(
            &self,
            cx: &mut EventCx<'_, (), u32>,
            event: &mut Event<u32>,
        ) -> Result<(), DispatchError> {
            self.log.lock().unwrap().push(self.name);
            if self.remove_self {
                cx.remove_handler();
            }
            if self.stop {
                event.stop_propagation();
            }
            if self.fail {
                return Err(DispatchError::failed("boom"));
            }
            Ok(())
        }
    }

    /// Single-active probe that optionally passes through.
    struct Speaker {
        name: &'static str,
        log: Log,
        pass: bool,
    }

    #[async_trait]
    impl Handler<(), u32> for Speaker {
        async fn on_message(
            &self,
            cx: &mut MessageCx<'_, (), u32>,
            msg: &u32,
        ) -> Result<(), DispatchError> {
            self.log.lock().unwrap().push(self.name);
            if self.pass {
                return cx.passthrough(msg).await;
            }
            Ok(())
        }
    }

    fn speaker(name: &'static str, log: &Log, pass: bool) -> Arc<Speaker> {
        Arc::new(Speaker {
            name,
            log: Arc::clone(log),
            pass,
        })
    }

    // ---- mailbox behavior ----

    #[tokio::test]
    async fn test_send_succeeds_up_to_capacity_then_overflow_closes() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        for n in 0..10 {
            endpoint.send(n).expect("within capacity");
        }

        assert!(matches!(endpoint.send(10), Err(SendError::Overflow)));
        assert!(!endpoint.is_open());
        assert_eq!(endpoint.depth(), 0);
        assert!(matches!(endpoint.send(11), Err(SendError::Closed)));
    }

    #[tokio::test]
    async fn test_recv_drains_buffered_then_reports_closed() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.send(1).unwrap();
        endpoint.send(2).unwrap();
        endpoint.close();

        assert_eq!(endpoint.recv().await, Some(1));
        assert_eq!(endpoint.recv().await, Some(2));
        assert_eq!(endpoint.recv().await, None);
    }

    #[tokio::test]
    async fn test_recv_unblocks_when_closed() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        let consumer = endpoint.clone();
        let waiter = tokio::spawn(async move { consumer.recv().await });

        tokio::task::yield_now().await;
        endpoint.close();

        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_cancels_token() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        let token = endpoint.closed();
        assert!(!token.is_cancelled());

        endpoint.close();
        endpoint.close();

        assert!(token.is_cancelled());
        assert!(!endpoint.is_open());
    }

    // ---- chain dispatch ----

    #[tokio::test]
    async fn test_chain_dispatch_runs_top_down() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::passive("b", &log)));
        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        endpoint.push_handler(Arc::new(Tracer::passive("h2", &log)));

        let mut event = Event::new("tick", 1);
        endpoint.dispatch(&mut event).await.unwrap();

        assert_eq!(taken(&log), vec!["h2", "h1", "b"]);
    }

    #[tokio::test]
    async fn test_stopped_event_halts_the_chain() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        endpoint.push_handler(Arc::new(Tracer::stopper("h2", &log)));

        let mut event = Event::new("tick", 1);
        endpoint.dispatch(&mut event).await.unwrap();

        assert_eq!(taken(&log), vec!["h2"]);
        assert!(event.is_stopped());
    }

    #[tokio::test]
    async fn test_handler_error_halts_the_chain() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        endpoint.push_handler(Arc::new(Tracer::failing("h2", &log)));

        let mut event = Event::new("tick", 1);
        let err = endpoint.dispatch(&mut event).await.unwrap_err();

        assert!(matches!(err, DispatchError::Failed { .. }));
        assert_eq!(taken(&log), vec!["h2"]);
    }

    #[tokio::test]
    async fn test_self_removal_leaves_rest_of_stack_intact() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::vanishing("h1", &log)));
        endpoint.push_handler(Arc::new(Tracer::passive("h2", &log)));

        let mut event = Event::new("tick", 1);
        endpoint.dispatch(&mut event).await.unwrap();
        assert_eq!(taken(&log), vec!["h2", "h1"]);
        // [base, h1, h2] minus h1 leaves [base, h2].
        assert_eq!(endpoint.depth(), 2);

        log.lock().unwrap().clear();
        let mut event = Event::new("tick", 2);
        endpoint.dispatch(&mut event).await.unwrap();
        assert_eq!(taken(&log), vec!["h2"]);
    }

    #[tokio::test]
    async fn test_dispatch_on_closed_endpoint_fails() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.close();

        let mut event = Event::new("tick", 1);
        let err = endpoint.dispatch(&mut event).await.unwrap_err();
        assert!(matches!(err, DispatchError::Closed));
    }

    // ---- single-active dispatch ----

    #[tokio::test]
    async fn test_handle_invokes_top_handler_only() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(speaker("h1", &log, false));
        endpoint.push_handler(speaker("h2", &log, false));

        endpoint.handle(&1).await.unwrap();
        assert_eq!(taken(&log), vec!["h2"]);
    }

    #[tokio::test]
    async fn test_passthrough_delegates_to_handler_beneath() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(speaker("h1", &log, false));
        endpoint.push_handler(speaker("h2", &log, true));

        endpoint.handle(&1).await.unwrap();
        assert_eq!(taken(&log), vec!["h2", "h1"]);
    }

    #[tokio::test]
    async fn test_passthrough_from_base_fails() {
        let log = log();
        let endpoint: Endpoint<(), u32> =
            Endpoint::with_base((), speaker("base", &log, true), &Config::default());

        let err = endpoint.handle(&1).await.unwrap_err();
        assert!(matches!(err, DispatchError::Passthrough));
        assert_eq!(taken(&log), vec!["base"]);
    }

    #[tokio::test]
    async fn test_fresh_endpoint_reports_unhandled() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        let err = endpoint.handle(&1).await.unwrap_err();
        assert!(matches!(err, DispatchError::Unhandled));
    }

    #[tokio::test]
    async fn test_handle_on_closed_endpoint_fails() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.close();
        let err = endpoint.handle(&1).await.unwrap_err();
        assert!(matches!(err, DispatchError::Closed));
    }

    // ---- stack mutation ----

    #[test]
    #[should_panic(expected = "cannot pop the base handler")]
    fn test_pop_on_base_only_stack_panics() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.pop_handler();
    }

    #[tokio::test]
    #[should_panic(expected = "cannot remove the base handler")]
    async fn test_base_removing_itself_panics() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::with_base(
            (),
            Arc::new(Tracer::vanishing("base", &log)),
            &Config::default(),
        );

        let mut event = Event::new("tick", 1);
        let _ = endpoint.dispatch(&mut event).await;
    }

    /// Removes its own slot twice in a single invocation.
    struct DoubleRemover;

    #[async_trait]
    impl Handler<(), u32> for DoubleRemover {
        async fn on_event(
            &self,
            cx: &mut EventCx<'_, (), u32>,
            _event: &mut Event<u32>,
        ) -> Result<(), DispatchError> {
            cx.remove_handler();
            cx.remove_handler();
            Ok(())
        }
    }

    #[tokio::test]
    #[should_panic(expected = "handler slot already removed during this invocation")]
    async fn test_removing_the_same_slot_twice_panics() {
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(DoubleRemover));

        let mut event = Event::new("tick", 1);
        let _ = endpoint.dispatch(&mut event).await;
    }

    #[tokio::test]
    async fn test_pop_on_two_deep_stack_leaves_base() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        assert_eq!(endpoint.depth(), 2);

        endpoint.pop_handler();
        assert_eq!(endpoint.depth(), 1);

        let mut event = Event::new("tick", 1);
        endpoint.dispatch(&mut event).await.unwrap();
        assert!(taken(&log).is_empty());
    }

    #[tokio::test]
    async fn test_replace_swaps_top_without_changing_depth() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        endpoint.replace_handler(Arc::new(Tracer::passive("h2", &log)));
        assert_eq!(endpoint.depth(), 2);

        let mut event = Event::new("tick", 1);
        endpoint.dispatch(&mut event).await.unwrap();
        assert_eq!(taken(&log), vec!["h2"]);
    }

    #[test]
    fn test_stack_ops_are_inert_after_close() {
        let log = log();
        let endpoint: Endpoint<(), u32> = Endpoint::new(());
        endpoint.close();

        endpoint.push_handler(Arc::new(Tracer::passive("h1", &log)));
        endpoint.replace_handler(Arc::new(Tracer::passive("h2", &log)));
        endpoint.pop_handler();

        assert_eq!(endpoint.depth(), 0);
    }
}
