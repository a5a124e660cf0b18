//! # Observers: the injected logging collaborator.
//!
//! The registry reports its activity — endpoints joining, endpoints pruned
//! after failed sends, isolated dispatch failures — to an [`Observe`]
//! implementation supplied at build time. Observers see what happened; they
//! never influence it.
//!
//! ## Contents
//! - [`Notice`], [`NoticeKind`] — the notice data model.
//! - [`Observe`] — the observer trait.
//! - [`LogWriter`] — built-in stdout printer _(feature `logging`)_.

mod observe;

pub use observe::{Notice, NoticeKind, Observe};

// Optional: a simple built-in notice printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
