// nfchal-rs/nfchal/src/abort.rs

//! Cooperative cancellation token.
//!
//! Every blocking HAL operation suspends inside
//! [`RfTransceiver::wait_events`](crate::transceiver::RfTransceiver::wait_events),
//! which consumes a posted abort before looking at hardware events. Another
//! thread may clone the handle and call [`AbortHandle::post`] to unblock the
//! next (or current) wait with [`Error::Aborted`](crate::Error::Aborted).

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Cloneable abort token shared between the HAL instance and other threads.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    posted: Mutex<bool>,
    cond: Condvar,
}

impl AbortHandle {
    /// Create a fresh, unposted handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post an abort. The next blocking wait consumes it and returns
    /// `Error::Aborted`; a wait already in progress is woken.
    pub fn post(&self) {
        let mut posted = self.inner.posted.lock().expect("abort mutex poisoned");
        *posted = true;
        self.inner.cond.notify_all();
    }

    /// Consume a pending abort. Returns true if one was posted.
    pub fn consume(&self) -> bool {
        let mut posted = self.inner.posted.lock().expect("abort mutex poisoned");
        std::mem::take(&mut *posted)
    }

    /// Whether an abort is pending without consuming it.
    pub fn is_posted(&self) -> bool {
        *self.inner.posted.lock().expect("abort mutex poisoned")
    }

    /// Block up to `timeout` for an abort to be posted, consuming it.
    /// Returns true if an abort arrived within the window.
    ///
    /// Used by transceiver implementations whose event source has nothing
    /// pending, so a cross-thread `post` still interrupts the wait.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let posted = self.inner.posted.lock().expect("abort mutex poisoned");
        let (mut posted, _timed_out) = self
            .inner
            .cond
            .wait_timeout_while(posted, timeout, |posted| !*posted)
            .expect("abort mutex poisoned");
        std::mem::take(&mut *posted)
    }
}
