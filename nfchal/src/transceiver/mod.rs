// nfchal-rs/nfchal/src/transceiver/mod.rs

//! Device register interface: the capability contract a chip must expose and
//! the mock used by the test suites.

pub mod mock;
pub mod reg;
pub mod traits;

pub use mock::{MockTransceiver, ScriptStep, SharedMock};
pub use reg::{ChipCommand, Reg, bits};
pub use traits::{Events, RfTransceiver};
