//! # LogWriter — simple notice printer
//!
//! A minimal observer that prints incoming [`Notice`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [registered] slot=0
//! [pruned] slot=0 reason="send_overflow"
//! [dispatch-failed] slot=2 err="handler failed: bad payload"
//! ```

use crate::observers::{Notice, NoticeKind, Observe};

/// Notice writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Observe for LogWriter {
    fn notice(&self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Registered => {
                println!(
                    "[registered] slot={}",
                    notice.slot.map(|s| s.index()).unwrap_or_default()
                );
            }
            NoticeKind::Pruned => {
                println!(
                    "[pruned] slot={} reason={:?}",
                    notice.slot.map(|s| s.index()).unwrap_or_default(),
                    notice.error,
                );
            }
            NoticeKind::DispatchFailed => {
                println!(
                    "[dispatch-failed] slot={} err={:?}",
                    notice.slot.map(|s| s.index()).unwrap_or_default(),
                    notice.error,
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
