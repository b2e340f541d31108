// nfchal-rs/nfchal/src/transceiver/reg.rs

//! Functional register roles of a contactless front-end.
//!
//! The HAL is written against these roles, never against a physical chip's
//! address map; each [`RfTransceiver`](super::RfTransceiver) implementation
//! maps a role onto whatever register(s) its silicon provides.

/// Functional register file.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    /// Primary status: external field, crypto, timer state
    Status1,
    /// Secondary status
    Status2,
    /// Latched fault flags of the last operation
    ErrorFlags,
    /// Bit position of the first detected collision
    CollPos,
    /// Control: valid bits of the last received byte
    Control,
    /// Bit framing: Tx last bits, Rx align
    BitFraming,
    /// Transmit framing: CRC enable, speed
    TxMode,
    /// Receive framing: CRC enable, speed, multiple
    RxMode,
    /// Antenna driver and collision-avoidance control
    TxControl,
    /// Transmit modulation depth
    TxAsk,
    /// Modulation pulse width
    ModWidth,
    /// Receiver decoding threshold
    RxThreshold,
    /// Demodulator options: parity, sub-carrier
    Demod,
    /// Receive deaf time in bit durations
    RxWait,
    /// Transmit guard time, high byte
    TxWaitHi,
    /// Transmit guard time, low byte
    TxWaitLo,
    /// Timer prescaler, high nibble
    TPrescalerHi,
    /// Timer prescaler, low byte
    TPrescalerLo,
    /// Timer reload, high byte
    TReloadHi,
    /// Timer reload, low byte
    TReloadLo,
    /// Timer counter, high byte
    TCounterHi,
    /// Timer counter, low byte
    TCounterLo,
    /// Listen-mode technology selection
    ListenMode,
    /// Activation outcome: negotiated speed, active flag
    TargetStatus,
}

/// Number of functional registers; sizes the mock register file.
pub const REG_COUNT: usize = 24;

/// Bit assignments of the functional registers.
pub mod bits {
    /// External RF field detected
    pub const STATUS1_EXT_RF: u8 = 1 << 2;
    /// MIFARE Crypto1 unit is active
    pub const STATUS1_CRYPTO1_ON: u8 = 1 << 3;
    /// Timer is counting
    pub const STATUS1_TIMER_RUNNING: u8 = 1 << 0;

    /// Anti-collision conflict detected
    pub const ERR_COLL: u8 = 1 << 0;
    /// CRC mismatch
    pub const ERR_CRC: u8 = 1 << 1;
    /// Parity violation
    pub const ERR_PARITY: u8 = 1 << 2;
    /// Framing/protocol fault
    pub const ERR_PROTOCOL: u8 = 1 << 3;
    /// FIFO overflowed during receive
    pub const ERR_FIFO_OVFL: u8 = 1 << 4;
    /// Over-temperature shutdown engaged
    pub const ERR_TEMP: u8 = 1 << 5;
    /// RF fault (field lost or unexpectedly present)
    pub const ERR_RF: u8 = 1 << 6;
    /// Register transaction fault
    pub const ERR_WR: u8 = 1 << 7;

    /// Valid bits of the last received byte (0 = whole byte)
    pub const CONTROL_RX_BITS_MASK: u8 = 0x07;

    /// Valid bits of the last transmitted byte
    pub const BITFRAMING_TX_BITS_MASK: u8 = 0x07;
    /// First-bit alignment of reception
    pub const BITFRAMING_RX_ALIGN_MASK: u8 = 0x70;
    pub const BITFRAMING_RX_ALIGN_SHIFT: u8 = 4;

    /// CRC generation enabled on transmit
    pub const TXMODE_CRC_EN: u8 = 1 << 7;
    /// Transmit speed field
    pub const TXMODE_SPEED_MASK: u8 = 0x70;
    pub const TXMODE_SPEED_SHIFT: u8 = 4;

    /// CRC checking enabled on receive
    pub const RXMODE_CRC_EN: u8 = 1 << 7;
    /// Receive speed field
    pub const RXMODE_SPEED_MASK: u8 = 0x70;
    pub const RXMODE_SPEED_SHIFT: u8 = 4;
    /// Keep receiving after a frame completes
    pub const RXMODE_MULTIPLE: u8 = 1 << 2;

    /// Antenna driver 1 enabled
    pub const TXCONTROL_TX1: u8 = 1 << 0;
    /// Antenna driver 2 enabled
    pub const TXCONTROL_TX2: u8 = 1 << 1;
    /// Perform initial RF collision avoidance when enabling the field
    pub const TXCONTROL_INITIAL_RFCA: u8 = 1 << 2;
    /// Autonomous collision avoidance for active communication
    pub const TXCONTROL_AUTO_RFCA: u8 = 1 << 3;

    /// Parity generation and checking enabled
    pub const DEMOD_PARITY_EN: u8 = 1 << 4;
    /// Sub-carrier selection field
    pub const DEMOD_SUBCARRIER_MASK: u8 = 0x03;

    /// Listen for passive Type A
    pub const LISTEN_A: u8 = 1 << 0;
    /// Listen for passive Type B (never set by the HAL; see autocoll)
    pub const LISTEN_B: u8 = 1 << 1;
    /// Listen for passive Felica
    pub const LISTEN_F: u8 = 1 << 2;
    /// Listen for active Type A framing
    pub const LISTEN_ACTIVE_A: u8 = 1 << 4;
    /// Listen for active Felica framing
    pub const LISTEN_ACTIVE_F: u8 = 1 << 5;

    /// Negotiated speed of an activation
    pub const TARGET_SPEED_MASK: u8 = 0x07;
    /// Activation used active communication
    pub const TARGET_ACTIVE: u8 = 1 << 3;
    /// Activation outcome is valid
    pub const TARGET_VALID: u8 = 1 << 7;
}

/// Command strobes of the front-end command unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipCommand {
    /// Cancel any running command, return to idle
    Idle,
    /// Soft reset
    SoftReset,
    /// Load configuration data from the FIFO
    Configure,
    /// Transmit the FIFO contents
    Transmit,
    /// Receive into the FIFO
    Receive,
    /// Transmit then automatically receive
    Transceive,
    /// Autonomous listen-mode activation
    Autocoll,
    /// MIFARE Classic authentication with key material from the FIFO
    MifareAuthent,
}
