//! # Registry notices and the observer hook.
//!
//! The registry reports connect/disconnect/dispatch-error activity to an
//! injected [`Observe`] collaborator instead of a process-wide logger.
//! Notices are purely informational: nothing an observer does feeds back
//! into core behavior.
//!
//! ## Example
//! ```
//! use peerhub::{Notice, NoticeKind, Observe};
//!
//! struct Stderr;
//!
//! impl Observe for Stderr {
//!     fn notice(&self, notice: &Notice) {
//!         if matches!(notice.kind, NoticeKind::Pruned) {
//!             eprintln!("dropped peer: slot={:?} reason={:?}", notice.slot, notice.error);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "stderr"
//!     }
//! }
//! ```

use std::time::SystemTime;

use crate::registry::SlotId;

/// Classification of registry notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// An endpoint joined the live set.
    ///
    /// Sets:
    /// - `slot`: the assigned registry slot
    /// - `at`: wall-clock timestamp
    Registered,

    /// An endpoint was removed from the live set after a failed broadcast
    /// send (already closed, or just overflowed).
    ///
    /// Sets:
    /// - `slot`: the vacated registry slot
    /// - `error`: the send-failure label (e.g. `"send_overflow"`)
    /// - `at`: wall-clock timestamp
    Pruned,

    /// A broadcast delivery failed on one endpoint; the endpoint stays
    /// registered.
    ///
    /// Sets:
    /// - `slot`: the affected registry slot
    /// - `error`: the dispatch-failure label or message
    /// - `at`: wall-clock timestamp
    DispatchFailed,
}

/// A single registry notice with optional metadata.
#[derive(Debug, Clone)]
pub struct Notice {
    /// What happened.
    pub kind: NoticeKind,
    /// The registry slot involved, when one applies.
    pub slot: Option<SlotId>,
    /// Failure label or message, when one applies.
    pub error: Option<String>,
    /// Wall-clock time the notice was produced.
    pub at: SystemTime,
}

impl Notice {
    /// Creates a notice of the given kind, timestamped now.
    pub fn now(kind: NoticeKind) -> Self {
        Self {
            kind,
            slot: None,
            error: None,
            at: SystemTime::now(),
        }
    }

    /// Attaches the registry slot involved.
    pub fn with_slot(mut self, slot: SlotId) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a failure label or message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }
}

/// Observer hook for registry activity.
///
/// Implementations must be cheap and non-blocking: notices are delivered
/// inline from the registry's broadcast paths (including the synchronous
/// [`send_all`](crate::Registry::send_all)). Ship anything expensive to a
/// channel of your own.
pub trait Observe: Send + Sync {
    /// Receives a single notice.
    fn notice(&self, notice: &Notice);

    /// Returns the observer name used in logs/diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose;
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
