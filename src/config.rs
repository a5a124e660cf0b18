//! # Endpoint configuration.
//!
//! Provides [`Config`], the knobs applied to every endpoint a registry
//! creates.
//!
//! ## Sentinel values
//! - `mailbox_capacity` is clamped to a minimum of 1; a zero-capacity mailbox
//!   would overflow (and close the endpoint) on the very first send.

/// Configuration for endpoints created directly or through a registry.
///
/// ## Field semantics
/// - `mailbox_capacity`: outbound queue depth per endpoint. The queue is
///   bounded and non-blocking; a send against a full mailbox drops the
///   message and forcibly closes the endpoint.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the bounded outbound mailbox.
    ///
    /// A slow consumer that lets this many items pile up is evicted on the
    /// next send rather than blocking the producer. Minimum effective value
    /// is 1 (enforced by [`Config::mailbox_capacity_clamped`]).
    pub mailbox_capacity: usize,
}

impl Config {
    /// Returns the mailbox capacity clamped to a minimum of 1.
    ///
    /// Endpoints should use this value to avoid constructing an invalid
    /// channel.
    #[inline]
    pub fn mailbox_capacity_clamped(&self) -> usize {
        self.mailbox_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `mailbox_capacity = 10` (a handful of in-flight replies; slow peers
    ///   are evicted early instead of buffering deeply)
    fn default() -> Self {
        Self {
            mailbox_capacity: 10,
        }
    }
}
