//! Timeout helpers used across the crate.
//!
//! Keep these helpers minimal: they centralize the default event-wait window
//! and provide a small conversion helper so tests and code can express
//! timeouts in milliseconds clearly.

use std::time::Duration;

/// Default window a transceiver implementation blocks for when its event
/// source has nothing pending and no hardware timer is armed.
pub const DEFAULT_EVENT_TIMEOUT_MS: u64 = 250;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default event-wait window as Duration.
pub fn default_event_timeout() -> Duration {
    ms(DEFAULT_EVENT_TIMEOUT_MS)
}
