//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common mock setup so tests across the crate and
//! the tests/ directory can reuse the same logic.
#![allow(dead_code)]

use crate::hal::{Hal, HalBuilder};
use crate::transceiver::{SharedMock, bits};

/// Build an initialized [`Hal`] over a fresh [`SharedMock`], returning both
/// so the test keeps inspecting the mock.
#[doc(hidden)]
pub fn shared_mock_hal() -> (Hal, SharedMock) {
    let shared = SharedMock::new();
    let hal = Hal::new(shared.boxed()).expect("mock init");
    (hal, shared)
}

/// Same as [`shared_mock_hal`] with explicit buffer sizes.
#[doc(hidden)]
pub fn shared_mock_hal_with_buffers(tx_len: usize, rx_len: usize) -> (Hal, SharedMock) {
    let shared = SharedMock::new();
    let hal = HalBuilder::new()
        .with_transceiver(shared.boxed())
        .buffer_sizes(tx_len, rx_len)
        .build()
        .expect("mock init");
    (hal, shared)
}

/// Target-status register value for a passive activation at the given
/// speed bits (0 = 106, 1 = 212, 2 = 424).
#[doc(hidden)]
pub fn passive_target_status(speed_bits: u8) -> u8 {
    bits::TARGET_VALID | (speed_bits & bits::TARGET_SPEED_MASK)
}

/// Target-status register value for an active-communication activation.
#[doc(hidden)]
pub fn active_target_status(speed_bits: u8) -> u8 {
    bits::TARGET_VALID | bits::TARGET_ACTIVE | (speed_bits & bits::TARGET_SPEED_MASK)
}
