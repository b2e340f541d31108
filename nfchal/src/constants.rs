// nfchal-rs/nfchal/src/constants.rs
//! HAL-level constants shared across the crate

/// NFCIP-1 start byte prepended to passive 106 kbit/s peer-to-peer frames
pub const NFCIP_START_BYTE: u8 = 0xF0;

/// Reference carrier clock in kHz (13.56 MHz)
pub const CARRIER_CLOCK_KHZ: u32 = 13_560;

/// Largest prescaler the timer unit accepts
pub const TIMER_PRESCALER_MAX: u16 = 0x0FFF;

/// Largest reload value of the 16-bit timer counter
pub const TIMER_RELOAD_MAX: u16 = 0xFFFF;

/// Receive pipeline latency compensated by the timing engine, in bit durations
pub const TIMER_SHIFT_BITS: u32 = 5;

/// Extra digital processing delay for Felica and fast active communication, in us
pub const FELICA_DIGITAL_DELAY_US: u32 = 240;

/// Single-shot ceiling for millisecond waits; longer waits are chained
pub const WAIT_SINGLE_SHOT_MAX_MS: u32 = 1000;

/// Default field-off duration for a field reset, in ms
pub const DEFAULT_FIELD_OFF_MS: u16 = 5;

/// Default field-recovery duration after re-enabling the field, in ms
pub const DEFAULT_FIELD_RECOVERY_MS: u16 = 5;

/// Default receive timeout applied until a profile overrides it, in us
pub const DEFAULT_TIMEOUT_US: u16 = 150;

/// Minimum length of an activating frame after framing bytes are stripped
pub const MIN_ACTIVATION_FRAME_LEN: usize = 2;

/// Default transmit buffer capacity in bytes
pub const DEFAULT_TX_BUFFER_LEN: usize = 256;

/// Default receive buffer capacity in bytes
pub const DEFAULT_RX_BUFFER_LEN: usize = 256;

/// Serialized length of the listen parameter set (SENS_RES + NFCID1 +
/// SEL_RES + Felica polling response + NFCID3)
pub const LISTEN_PARAMETER_LEN: usize = 25;

/// MIFARE Classic authentication command codes for key A / key B
pub const MIFARE_AUTH_KEY_A: u8 = 0x60;
pub const MIFARE_AUTH_KEY_B: u8 = 0x61;
