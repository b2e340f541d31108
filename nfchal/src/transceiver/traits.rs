// nfchal-rs/nfchal/src/transceiver/traits.rs

use crate::Result;
use crate::abort::AbortHandle;
use crate::transceiver::reg::{ChipCommand, Reg};

/// Interrupt-sourced hardware events, as a small bitset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    derive_more::BitOr,
    derive_more::BitAnd,
    derive_more::BitOrAssign,
)]
pub struct Events(u16);

impl Events {
    /// Empty set
    pub const NONE: Self = Self(0);
    /// Transmission finished
    pub const TX_DONE: Self = Self(1 << 0);
    /// A complete frame was received
    pub const RX_DONE: Self = Self(1 << 1);
    /// The armed timer expired
    pub const TIMER: Self = Self(1 << 2);
    /// Transmit FIFO fell below its watermark
    pub const FIFO_LOW: Self = Self(1 << 3);
    /// Receive FIFO rose above its watermark
    pub const FIFO_HIGH: Self = Self(1 << 4);
    /// A fault was latched into the error flags
    pub const ERROR: Self = Self(1 << 5);
    /// External RF field appeared
    pub const FIELD_ON: Self = Self(1 << 6);
    /// External RF field vanished
    pub const FIELD_OFF: Self = Self(1 << 7);
    /// Autonomous activation completed
    pub const ACTIVATED: Self = Self(1 << 8);
    /// The command unit returned to idle
    pub const IDLE: Self = Self(1 << 9);

    /// Raw bit value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether all bits of `other` are present.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is present.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when no event is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Register-level capability contract of a contactless front-end chip.
///
/// One implementation exists per physical chip (plus [`MockTransceiver`]
/// for tests); the HAL engines are written purely against this trait.
///
/// [`MockTransceiver`]: crate::transceiver::MockTransceiver
pub trait RfTransceiver {
    /// Read a functional register.
    fn read(&mut self, reg: Reg) -> Result<u8>;

    /// Write a functional register.
    fn write(&mut self, reg: Reg, value: u8) -> Result<()>;

    /// Set bits in a register. Default: read-modify-write.
    fn set_bits(&mut self, reg: Reg, mask: u8) -> Result<()> {
        let v = self.read(reg)?;
        self.write(reg, v | mask)
    }

    /// Clear bits in a register. Default: read-modify-write.
    fn clear_bits(&mut self, reg: Reg, mask: u8) -> Result<()> {
        let v = self.read(reg)?;
        self.write(reg, v & !mask)
    }

    /// Write a 16-bit value across a register pair, high byte first.
    fn write_u16(&mut self, hi: Reg, lo: Reg, value: u16) -> Result<()> {
        self.write(hi, (value >> 8) as u8)?;
        self.write(lo, (value & 0xFF) as u8)
    }

    /// Read a 16-bit value from a register pair.
    fn read_u16(&mut self, hi: Reg, lo: Reg) -> Result<u16> {
        let h = self.read(hi)?;
        let l = self.read(lo)?;
        Ok(u16::from_be_bytes([h, l]))
    }

    /// Append bytes to the FIFO. Returns how many were accepted; fewer than
    /// `data.len()` means the FIFO is full up to its watermark.
    fn write_fifo(&mut self, data: &[u8]) -> Result<usize>;

    /// Drain bytes from the FIFO into `out`. Returns how many were read.
    fn read_fifo(&mut self, out: &mut [u8]) -> Result<usize>;

    /// Number of bytes currently held by the FIFO.
    fn fifo_level(&mut self) -> Result<usize>;

    /// Discard the FIFO contents.
    fn flush_fifo(&mut self) -> Result<()>;

    /// FIFO capacity in bytes.
    fn fifo_capacity(&self) -> usize {
        64
    }

    /// Reference clock feeding the timer unit, in kHz.
    fn clock_khz(&self) -> u32 {
        crate::constants::CARRIER_CLOCK_KHZ
    }

    /// Strobe a command into the command unit.
    fn command(&mut self, cmd: ChipCommand) -> Result<()>;

    /// Block until any of the `wanted` events fires, the armed timer expires
    /// (reported as [`Events::TIMER`]), or `abort` is posted (reported as
    /// [`crate::Error::Aborted`]). Returns the events observed; events
    /// outside `wanted` may be included.
    fn wait_events(&mut self, wanted: Events, abort: &AbortHandle) -> Result<Events>;

    /// Acknowledge and clear pending events.
    fn consume_events(&mut self, mask: Events) -> Result<()>;
}
