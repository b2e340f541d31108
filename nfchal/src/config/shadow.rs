// nfchal-rs/nfchal/src/config/shadow.rs

//! Configuration shadow: the in-memory mirror of applied hardware
//! configuration.
//!
//! Every mutating `set_config` commits to hardware before the shadow is
//! updated, so a stored value never describes a bus transaction that did not
//! happen. Derived keys dispatch through an explicit handler table instead
//! of a per-key branch.

use std::collections::BTreeMap;

use log::trace;

use crate::constants::{DEFAULT_FIELD_OFF_MS, DEFAULT_FIELD_RECOVERY_MS, DEFAULT_TIMEOUT_US};
use crate::hal::Hal;
use crate::transceiver::{Reg, bits};
use crate::types::{CardType, ConfigKey, DataRate, TimeUnit};
use crate::{Error, Result};

/// Key-value mirror of the applied configuration.
#[derive(Debug, Default)]
pub struct ConfigShadow {
    values: BTreeMap<ConfigKey, u16>,
}

impl ConfigShadow {
    pub fn new() -> Self {
        let mut shadow = Self::default();
        // Keys that are read back before any profile writes them.
        shadow.store(ConfigKey::RxLastBits, 0);
        shadow.store(ConfigKey::MfCrypto1, 0);
        shadow
    }

    /// Record `value` for `key`.
    pub fn store(&mut self, key: ConfigKey, value: u16) {
        self.values.insert(key, value);
    }

    /// Last value recorded for `key`, if any.
    pub fn fetch(&self, key: ConfigKey) -> Option<u16> {
        self.values.get(&key).copied()
    }
}

/// Settings committed at init time, before any protocol profile is applied.
pub const DEFAULT_SETTINGS: &[(ConfigKey, u16)] = &[
    (ConfigKey::Parity, 1),
    (ConfigKey::TxCrc, 1),
    (ConfigKey::RxCrc, 1),
    (ConfigKey::TxLastBits, 0),
    (ConfigKey::RxAlign, 0),
    (ConfigKey::TxDataRate, 0),
    (ConfigKey::RxDataRate, 0),
    (ConfigKey::RxWaitUs, 76),
    (ConfigKey::TxWaitUs, 81),
    (ConfigKey::TimeoutUs, DEFAULT_TIMEOUT_US),
    (ConfigKey::FieldOffTimeMs, DEFAULT_FIELD_OFF_MS),
    (ConfigKey::FieldRecoveryTimeMs, DEFAULT_FIELD_RECOVERY_MS),
    (ConfigKey::JewelMode, 0),
    (ConfigKey::RfResetAfterTimeout, 0),
    (ConfigKey::MifareHalted, 0),
    (ConfigKey::RxMultiple, 0),
];

type Handler = fn(&mut Hal, u16) -> Result<()>;

/// Keys whose commitment is more than a register store. Everything else is
/// written to the shadow only.
const DERIVED_HANDLERS: &[(ConfigKey, Handler)] = &[
    (ConfigKey::Parity, Hal::apply_parity),
    (ConfigKey::TxCrc, Hal::apply_tx_crc),
    (ConfigKey::RxCrc, Hal::apply_rx_crc),
    (ConfigKey::TxLastBits, Hal::apply_tx_last_bits),
    (ConfigKey::RxAlign, Hal::apply_rx_align),
    (ConfigKey::RxWaitUs, Hal::apply_rx_wait),
    (ConfigKey::TxWaitUs, Hal::apply_tx_wait),
    (ConfigKey::TxDataRate, Hal::apply_tx_data_rate),
    (ConfigKey::RxDataRate, Hal::apply_rx_data_rate),
    (ConfigKey::Subcarrier, Hal::apply_subcarrier),
    (ConfigKey::TimeoutUs, Hal::apply_timeout_us),
    (ConfigKey::TimeoutMs, Hal::apply_timeout_ms),
    (ConfigKey::JewelMode, Hal::apply_jewel_mode),
    (ConfigKey::MfCrypto1, Hal::apply_mf_crypto1),
    (ConfigKey::RxMultiple, Hal::apply_rx_multiple),
];

fn derived_handler(key: ConfigKey) -> Option<Handler> {
    DERIVED_HANDLERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, h)| *h)
}

impl Hal {
    /// Set a configuration value. Derived keys commit register state before
    /// the shadow is updated; plain keys are stored only.
    pub fn set_config(&mut self, key: ConfigKey, value: u16) -> Result<()> {
        self.validate_config(key, value)?;
        if let Some(handler) = derived_handler(key) {
            handler(self, value)?;
        }
        trace!("set_config {key:?} = {value:#x}");
        self.shadow.store(key, value);
        Ok(())
    }

    /// Read a configuration value from the shadow.
    pub fn get_config(&self, key: ConfigKey) -> Result<u16> {
        self.shadow.fetch(key).ok_or_else(|| {
            Error::UnsupportedParameter(format!("{key:?} has no value in the current profile"))
        })
    }

    fn validate_config(&self, key: ConfigKey, value: u16) -> Result<()> {
        use ConfigKey::*;
        match key {
            RxLastBits => {
                return Err(Error::UnsupportedParameter(
                    "RxLastBits is read-only".to_string(),
                ));
            }
            Parity | TxCrc | RxCrc | JewelMode | RfResetAfterTimeout | MifareHalted
            | RxMultiple => {
                if value > 1 {
                    return Err(Error::InvalidParameter(format!(
                        "{key:?}={value} is not a boolean"
                    )));
                }
            }
            TxLastBits | RxAlign => {
                if value > 7 {
                    return Err(Error::InvalidParameter(format!(
                        "{key:?}={value} exceeds 7"
                    )));
                }
            }
            TxDataRate | RxDataRate => {
                DataRate::try_from(value)?;
            }
            Subcarrier => {
                if !self.card_type.supports_subcarrier() {
                    return Err(Error::UseCondition(format!(
                        "sub-carrier configuration is not valid for {}",
                        self.card_type
                    )));
                }
                if value > 2 {
                    return Err(Error::InvalidParameter(format!(
                        "sub-carrier selection {value} out of range"
                    )));
                }
            }
            MfCrypto1 => {
                if value != 0 {
                    return Err(Error::InvalidParameter(
                        "MfCrypto1 can only be written with 0 to clear the state".to_string(),
                    ));
                }
            }
            FieldOffTimeMs | FieldRecoveryTimeMs => {
                if value == 0 {
                    return Err(Error::InvalidParameter(format!(
                        "{key:?} must be at least 1 ms"
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_parity(&mut self, value: u16) -> Result<()> {
        if value != 0 {
            self.dev.set_bits(Reg::Demod, bits::DEMOD_PARITY_EN)
        } else {
            self.dev.clear_bits(Reg::Demod, bits::DEMOD_PARITY_EN)
        }
    }

    fn apply_tx_crc(&mut self, value: u16) -> Result<()> {
        if value != 0 {
            self.dev.set_bits(Reg::TxMode, bits::TXMODE_CRC_EN)
        } else {
            self.dev.clear_bits(Reg::TxMode, bits::TXMODE_CRC_EN)
        }
    }

    fn apply_rx_crc(&mut self, value: u16) -> Result<()> {
        if value != 0 {
            self.dev.set_bits(Reg::RxMode, bits::RXMODE_CRC_EN)
        } else {
            self.dev.clear_bits(Reg::RxMode, bits::RXMODE_CRC_EN)
        }
    }

    fn apply_tx_last_bits(&mut self, value: u16) -> Result<()> {
        let v = self.dev.read(Reg::BitFraming)?;
        let v = (v & !bits::BITFRAMING_TX_BITS_MASK) | (value as u8 & bits::BITFRAMING_TX_BITS_MASK);
        self.dev.write(Reg::BitFraming, v)
    }

    fn apply_rx_align(&mut self, value: u16) -> Result<()> {
        let v = self.dev.read(Reg::BitFraming)?;
        let v = (v & !bits::BITFRAMING_RX_ALIGN_MASK)
            | (((value as u8) << bits::BITFRAMING_RX_ALIGN_SHIFT) & bits::BITFRAMING_RX_ALIGN_MASK);
        self.dev.write(Reg::BitFraming, v)
    }

    /// Convert microseconds to bit durations at the given rate, rounded up.
    fn wait_bits(us: u16, rate: DataRate) -> u32 {
        (u32::from(us) * rate.kbps()).div_ceil(1000)
    }

    fn apply_rx_wait(&mut self, value: u16) -> Result<()> {
        let bits_count = Self::wait_bits(value, self.rx_data_rate());
        if bits_count > 0xFF {
            return Err(Error::InvalidParameter(format!(
                "RxWaitUs={value} exceeds the deaf-time counter at {}",
                self.rx_data_rate()
            )));
        }
        self.dev.write(Reg::RxWait, bits_count as u8)
    }

    fn apply_tx_wait(&mut self, value: u16) -> Result<()> {
        let bits_count = Self::wait_bits(value, self.tx_data_rate());
        if bits_count > 0xFFFF {
            return Err(Error::InvalidParameter(format!(
                "TxWaitUs={value} exceeds the guard-time counter"
            )));
        }
        self.dev
            .write_u16(Reg::TxWaitHi, Reg::TxWaitLo, bits_count as u16)
    }

    fn apply_tx_data_rate(&mut self, value: u16) -> Result<()> {
        let rate = DataRate::try_from(value)?;
        let v = self.dev.read(Reg::TxMode)?;
        let v = (v & !bits::TXMODE_SPEED_MASK)
            | ((rate.speed_bits() << bits::TXMODE_SPEED_SHIFT) & bits::TXMODE_SPEED_MASK);
        self.dev.write(Reg::TxMode, v)?;
        self.reclassify_card_type(rate);
        Ok(())
    }

    fn apply_rx_data_rate(&mut self, value: u16) -> Result<()> {
        let rate = DataRate::try_from(value)?;
        let v = self.dev.read(Reg::RxMode)?;
        let v = (v & !bits::RXMODE_SPEED_MASK)
            | ((rate.speed_bits() << bits::RXMODE_SPEED_SHIFT) & bits::RXMODE_SPEED_MASK);
        self.dev.write(Reg::RxMode, v)?;
        self.reclassify_card_type(rate);
        Ok(())
    }

    /// A data-rate change can move the instance between the Felica speed
    /// classes; other technologies keep their classification.
    fn reclassify_card_type(&mut self, rate: DataRate) {
        self.card_type = match (self.card_type, rate) {
            (CardType::Felica212, DataRate::R424) => CardType::Felica424,
            (CardType::Felica424, DataRate::R212) => CardType::Felica212,
            (current, _) => current,
        };
    }

    fn apply_subcarrier(&mut self, value: u16) -> Result<()> {
        let v = self.dev.read(Reg::Demod)?;
        let v = (v & !bits::DEMOD_SUBCARRIER_MASK) | (value as u8 & bits::DEMOD_SUBCARRIER_MASK);
        self.dev.write(Reg::Demod, v)
    }

    fn apply_timeout_us(&mut self, value: u16) -> Result<()> {
        let setting = self.timeout_setting(TimeUnit::Microseconds, u32::from(value))?;
        self.arm_timer(setting)
    }

    fn apply_timeout_ms(&mut self, value: u16) -> Result<()> {
        let setting = self.timeout_setting(TimeUnit::Milliseconds, u32::from(value))?;
        self.arm_timer(setting)
    }

    fn apply_jewel_mode(&mut self, value: u16) -> Result<()> {
        if value != 0 {
            self.jewel_mode = true;
            // Topaz frames carry no hardware CRC and end bit-oriented.
            self.dev.clear_bits(Reg::TxMode, bits::TXMODE_CRC_EN)?;
            self.dev.clear_bits(Reg::RxMode, bits::RXMODE_CRC_EN)?;
            self.apply_tx_last_bits(7)
        } else {
            self.jewel_mode = false;
            let tx_crc = self.shadow.fetch(ConfigKey::TxCrc).unwrap_or(0);
            let rx_crc = self.shadow.fetch(ConfigKey::RxCrc).unwrap_or(0);
            self.apply_tx_crc(tx_crc)?;
            self.apply_rx_crc(rx_crc)?;
            self.apply_tx_last_bits(0)
        }
    }

    fn apply_mf_crypto1(&mut self, _value: u16) -> Result<()> {
        self.dev.clear_bits(Reg::Status1, bits::STATUS1_CRYPTO1_ON)
    }

    fn apply_rx_multiple(&mut self, value: u16) -> Result<()> {
        if value != 0 {
            self.dev.set_bits(Reg::RxMode, bits::RXMODE_MULTIPLE)
        } else {
            self.dev.clear_bits(Reg::RxMode, bits::RXMODE_MULTIPLE)
        }
    }
}
