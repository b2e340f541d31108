// nfchal-rs/nfchal/src/types.rs

use crate::Error;
use crate::constants::LISTEN_PARAMETER_LEN;
use std::convert::TryFrom;

/// Technology / protocol family selected by `apply_protocol_settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardType {
    /// ISO/IEC 14443 Type A
    #[display(fmt = "ISO 14443 Type A")]
    Iso14443a,
    /// ISO/IEC 14443 Type B
    #[display(fmt = "ISO 14443 Type B")]
    Iso14443b,
    /// Felica at 212 kbit/s
    #[display(fmt = "Felica 212")]
    Felica212,
    /// Felica at 424 kbit/s
    #[display(fmt = "Felica 424")]
    Felica424,
    /// ISO/IEC 15693 vicinity cards
    #[display(fmt = "ISO 15693")]
    Iso15693,
    /// ISO/IEC 18000-3 mode 3
    #[display(fmt = "ISO 18000-3m3")]
    Iso18000p3m3,
    /// ISO/IEC 18092 peer-to-peer
    #[display(fmt = "ISO 18092")]
    Iso18092,
    /// Pseudo-type: keep the current profile, re-derive mode-dependent bits
    #[display(fmt = "current")]
    Current,
}

impl CardType {
    /// Whether the sub-carrier configuration key applies to this technology.
    pub fn supports_subcarrier(self) -> bool {
        matches!(self, CardType::Iso15693 | CardType::Iso18000p3m3)
    }
}

/// RF data rate. The discriminant doubles as the configuration value and the
/// 3-bit speed field written to the mode registers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataRate {
    /// 106 kbit/s
    #[display(fmt = "106 kbit/s")]
    R106 = 0,
    /// 212 kbit/s
    #[display(fmt = "212 kbit/s")]
    R212 = 1,
    /// 424 kbit/s
    #[display(fmt = "424 kbit/s")]
    R424 = 2,
    /// 848 kbit/s
    #[display(fmt = "848 kbit/s")]
    R848 = 3,
    /// 26 kbit/s (ISO 15693 low)
    #[display(fmt = "26 kbit/s")]
    R26 = 4,
    /// 53 kbit/s (ISO 15693 high)
    #[display(fmt = "53 kbit/s")]
    R53 = 5,
}

impl DataRate {
    /// Nominal rate in kbit/s, rounded to the customary integer value.
    pub fn kbps(self) -> u32 {
        match self {
            DataRate::R106 => 106,
            DataRate::R212 => 212,
            DataRate::R424 => 424,
            DataRate::R848 => 848,
            DataRate::R26 => 26,
            DataRate::R53 => 53,
        }
    }

    /// 3-bit speed field for the Tx/Rx mode registers.
    pub fn speed_bits(self) -> u8 {
        self as u8
    }

    /// Decode the speed field of a mode or target-status register.
    pub fn from_speed_bits(bits: u8) -> Option<Self> {
        Self::try_from(u16::from(bits)).ok()
    }
}

impl TryFrom<u16> for DataRate {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataRate::R106),
            1 => Ok(DataRate::R212),
            2 => Ok(DataRate::R424),
            3 => Ok(DataRate::R848),
            4 => Ok(DataRate::R26),
            5 => Ok(DataRate::R53),
            other => Err(Error::InvalidParameter(format!(
                "data rate value {other} out of range"
            ))),
        }
    }
}

/// Unit of a timeout or wait duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Microseconds,
    Milliseconds,
}

/// Framing and speed negotiated when the device was activated as a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TargetFraming {
    #[display(fmt = "passive 106")]
    Passive106,
    #[display(fmt = "passive 212")]
    Passive212,
    #[display(fmt = "passive 424")]
    Passive424,
    #[display(fmt = "active 106")]
    Active106,
    #[display(fmt = "active 212")]
    Active212,
    #[display(fmt = "active 424")]
    Active424,
}

impl TargetFraming {
    /// Whether this is an active-communication framing.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TargetFraming::Active106 | TargetFraming::Active212 | TargetFraming::Active424
        )
    }

    /// The negotiated data rate.
    pub fn data_rate(self) -> DataRate {
        match self {
            TargetFraming::Passive106 | TargetFraming::Active106 => DataRate::R106,
            TargetFraming::Passive212 | TargetFraming::Active212 => DataRate::R212,
            TargetFraming::Passive424 | TargetFraming::Active424 => DataRate::R424,
        }
    }
}

/// Target-mode value of the HAL instance: off until an activation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Not activated as a target
    #[default]
    Off,
    /// Activated with the given framing and speed
    On(TargetFraming),
}

impl TargetMode {
    /// Whether a target activation is in effect.
    pub fn is_on(self) -> bool {
        matches!(self, TargetMode::On(_))
    }
}

/// Bitmap of listen technologies requested from the autocoll engine.
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
pub struct ListenTech(u16);

impl ListenTech {
    /// Passive ISO 14443 Type A
    pub const PASSIVE_A: Self = Self(0x0001);
    /// Passive ISO 14443 Type B. Accepted for interoperability but never
    /// listened for; see the autocoll engine.
    pub const PASSIVE_B: Self = Self(0x0002);
    /// Passive Felica (212 and 424 kbit/s)
    pub const PASSIVE_F: Self = Self(0x0004);
    /// Active-communication Type A framing
    pub const ACTIVE_A: Self = Self(0x0100);
    /// Active-communication Felica framing
    pub const ACTIVE_F: Self = Self(0x0400);

    /// Raw bitmap value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Rebuild from a raw bitmap, keeping only known bits.
    pub fn from_bits_truncate(bits: u16) -> Self {
        const KNOWN: u16 = 0x0001 | 0x0002 | 0x0004 | 0x0100 | 0x0400;
        Self(bits & KNOWN)
    }

    /// Whether all bits of `other` are set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set in `self`.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when no technology is requested.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any active-communication technology is requested.
    pub fn any_active(self) -> bool {
        self.intersects(Self::ACTIVE_A | Self::ACTIVE_F)
    }

    /// Whether any passive technology is requested.
    pub fn any_passive(self) -> bool {
        self.intersects(Self::PASSIVE_A | Self::PASSIVE_B | Self::PASSIVE_F)
    }
}

/// Configuration shadow keys. Values are 16-bit; boolean keys use 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigKey {
    /// Parity generation and checking (boolean)
    Parity,
    /// CRC generation on transmit (boolean)
    TxCrc,
    /// CRC checking on receive (boolean)
    RxCrc,
    /// Number of valid bits in the last transmitted byte (0 = all 8)
    TxLastBits,
    /// Number of valid bits in the last received byte (read-only)
    RxLastBits,
    /// Bit alignment of the first received byte (0..=7)
    RxAlign,
    /// Receive deaf time after transmit, in microseconds
    RxWaitUs,
    /// Guard time before transmit, in microseconds
    TxWaitUs,
    /// Transmit data rate (see [`DataRate`])
    TxDataRate,
    /// Receive data rate (see [`DataRate`])
    RxDataRate,
    /// Sub-carrier selection; ISO 15693 / ISO 18000-3m3 only
    Subcarrier,
    /// Receive timeout in microseconds
    TimeoutUs,
    /// Receive timeout in milliseconds
    TimeoutMs,
    /// Field-off duration of a field reset, in milliseconds
    FieldOffTimeMs,
    /// Field-recovery duration of a field reset, in milliseconds
    FieldRecoveryTimeMs,
    /// Jewel/Topaz framing mode (boolean)
    JewelMode,
    /// Apply a field reset after a receive timeout (boolean)
    RfResetAfterTimeout,
    /// MIFARE Crypto1 state: reads 1 while authenticated, write 0 to clear
    MfCrypto1,
    /// Restrict listening to Type A wake-up only (boolean)
    MifareHalted,
    /// Receive-multiple mode (boolean)
    RxMultiple,
}

/// Options of a `transmit` / `exchange` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// Append to the transmit buffer and return without sending.
    pub buffer_only: bool,
    /// Resend the previously transmitted frame unchanged. Only valid once a
    /// target has been activated.
    pub retransmit: bool,
}

impl TxOptions {
    /// Buffer the chunk without sending.
    pub fn buffered() -> Self {
        Self {
            buffer_only: true,
            ..Self::default()
        }
    }

    /// Resend the previous frame unchanged.
    pub fn retransmit_previous() -> Self {
        Self {
            retransmit: true,
            ..Self::default()
        }
    }
}

/// Hardware timer setting: prescaler and 16-bit reload value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSetting {
    pub prescaler: u16,
    pub reload: u16,
}

impl TimerSetting {
    /// Tick period denominator: each count lasts `(1 + 2 * prescaler)`
    /// carrier clocks.
    pub fn denominator(self) -> u64 {
        1 + 2 * u64::from(self.prescaler)
    }

    /// Duration this setting represents, in microseconds (floor).
    pub fn reconstructed_us(self, clock_khz: u32) -> u64 {
        u64::from(self.reload) * self.denominator() * 1000 / u64::from(clock_khz)
    }
}

/// Timer state read back from hardware for elapsed-time measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// The setting the timer was armed with
    pub setting: TimerSetting,
    /// Remaining counts at the time of the snapshot
    pub remaining: u16,
}

/// MIFARE Classic key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MifareKeyType {
    KeyA,
    KeyB,
}

impl MifareKeyType {
    /// Authentication command code sent to the card.
    pub fn command_code(self) -> u8 {
        match self {
            MifareKeyType::KeyA => crate::constants::MIFARE_AUTH_KEY_A,
            MifareKeyType::KeyB => crate::constants::MIFARE_AUTH_KEY_B,
        }
    }
}

/// MIFARE Classic key - Newtype Pattern (6 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MifareKey([u8; 6]);

impl MifareKey {
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MifareKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 6 {
            return Err(Error::InvalidParameter(format!(
                "MIFARE key must be 6 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 6];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// Identification and response data programmed into the chip before listen
/// mode is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenParams {
    /// SENS_RES / ATQA answered during Type A anti-collision
    pub sens_res: [u8; 2],
    /// First cascade level of the NFCID1 / UID
    pub nfcid1: [u8; 3],
    /// SEL_RES / SAK
    pub sel_res: u8,
    /// Felica polling response (response code, IDm, PMm, system code)
    pub poll_res: [u8; 18],
    /// NFCID3 tail byte used for ATR_RES
    pub nfcid3: u8,
}

impl ListenParams {
    /// Validate and build a listen parameter set.
    pub fn new(
        sens_res: [u8; 2],
        nfcid1: [u8; 3],
        sel_res: u8,
        poll_res: [u8; 18],
        nfcid3: u8,
    ) -> Result<Self, Error> {
        // 0x88 is the cascade tag and cannot start a NFCID1
        if nfcid1[0] == 0x88 {
            return Err(Error::InvalidParameter(
                "NFCID1 must not start with the cascade tag 0x88".to_string(),
            ));
        }
        if poll_res[0] != 0x01 {
            return Err(Error::InvalidParameter(
                "Felica polling response must start with response code 0x01".to_string(),
            ));
        }
        Ok(Self {
            sens_res,
            nfcid1,
            sel_res,
            poll_res,
            nfcid3,
        })
    }

    /// Serialize in the order the configuration command expects.
    pub fn serialize(&self) -> [u8; LISTEN_PARAMETER_LEN] {
        let mut out = [0u8; LISTEN_PARAMETER_LEN];
        out[0..2].copy_from_slice(&self.sens_res);
        out[2..5].copy_from_slice(&self.nfcid1);
        out[5] = self.sel_res;
        out[6..24].copy_from_slice(&self.poll_res);
        out[24] = self.nfcid3;
        out
    }
}

/// Borrowed view of a received frame. Valid until the next mutating HAL call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received<'a> {
    /// Frame contents in the receive buffer
    pub data: &'a [u8],
    /// Valid bits of the final byte when it is incomplete, `None` for a
    /// byte-aligned frame
    pub valid_bits: Option<u8>,
}

impl Received<'_> {
    /// Whether the frame ended on a byte boundary.
    pub fn is_complete(&self) -> bool {
        self.valid_bits.is_none()
    }
}

/// Result of a successful autocoll activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation<'a> {
    /// Negotiated framing and speed
    pub framing: TargetFraming,
    /// The activating frame with framing bytes already stripped. Valid until
    /// the next mutating HAL call.
    pub frame: &'a [u8],
}
