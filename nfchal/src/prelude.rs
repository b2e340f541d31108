// nfchal-rs/nfchal/src/prelude.rs

pub use crate::abort::AbortHandle;
pub use crate::hal::{Hal, HalBuilder, KeyStore, SlotKeyStore};
pub use crate::transceiver::{
    ChipCommand, Events, MockTransceiver, Reg, RfTransceiver, SharedMock,
};
pub use crate::{
    Activation, CardType, ConfigKey, DataRate, Error, ListenParams, ListenTech, MifareKey,
    MifareKeyType, Received, Result, TargetFraming, TargetMode, TimeUnit, TimerSetting, TxOptions,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_event_timeout, ms};
