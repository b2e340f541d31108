// nfchal-rs/nfchal/src/lib.rs

//! nfchal
//!
//! Chip-independent hardware abstraction layer for contactless/NFC reader
//! front-ends: configuration shadow and protocol profiles, timing engine,
//! RF frame exchange and autonomous target activation, written against a
//! register-level transceiver capability trait.
#![warn(missing_docs)]

pub mod abort;
pub mod autocoll;
pub mod config;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod hal;
pub mod prelude;
pub mod test_support;
pub mod timing;
pub mod transceiver;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
