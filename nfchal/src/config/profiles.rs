// nfchal-rs/nfchal/src/config/profiles.rs

//! Static per-technology protocol profiles: shadow defaults plus the
//! waveform register set selected with them.

use log::debug;

use crate::hal::Hal;
use crate::transceiver::Reg;
use crate::types::{CardType, ConfigKey, TargetMode};
use crate::{Error, Result};

/// One technology profile. Profiles are mutually exclusive per card type.
#[derive(Debug)]
pub struct Profile {
    /// Technology this profile belongs to
    pub card_type: CardType,
    /// Shadow defaults loaded by `apply_protocol_settings`
    pub defaults: &'static [(ConfigKey, u16)],
    /// Modulation/demodulation register values selected with the profile
    pub waveform: &'static [(Reg, u8)],
}

static ISO14443A: Profile = Profile {
    card_type: CardType::Iso14443a,
    defaults: &[
        (ConfigKey::Parity, 1),
        // REQA phase runs without CRC; protocol layers enable it after
        // anti-collision.
        (ConfigKey::TxCrc, 0),
        (ConfigKey::RxCrc, 0),
        (ConfigKey::TxDataRate, 0),
        (ConfigKey::RxDataRate, 0),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::RxWaitUs, 76),
        (ConfigKey::TxWaitUs, 81),
        (ConfigKey::TimeoutUs, 150),
    ],
    waveform: &[
        (Reg::TxAsk, 0x40),
        (Reg::ModWidth, 0x26),
        (Reg::RxThreshold, 0x55),
        (Reg::Demod, 0x4D),
    ],
};

static ISO14443B: Profile = Profile {
    card_type: CardType::Iso14443b,
    defaults: &[
        (ConfigKey::Parity, 0),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 0),
        (ConfigKey::RxDataRate, 0),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::RxWaitUs, 76),
        (ConfigKey::TxWaitUs, 85),
        (ConfigKey::TimeoutUs, 150),
    ],
    waveform: &[
        (Reg::TxAsk, 0x00),
        (Reg::ModWidth, 0x27),
        (Reg::RxThreshold, 0x50),
        (Reg::Demod, 0x44),
    ],
};

static FELICA_212: Profile = Profile {
    card_type: CardType::Felica212,
    defaults: &[
        (ConfigKey::Parity, 0),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 1),
        (ConfigKey::RxDataRate, 1),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::RxWaitUs, 24),
        (ConfigKey::TxWaitUs, 302),
        (ConfigKey::TimeoutUs, 2417),
    ],
    waveform: &[
        (Reg::TxAsk, 0x10),
        (Reg::ModWidth, 0x17),
        (Reg::RxThreshold, 0x35),
        (Reg::Demod, 0x4D),
    ],
};

static FELICA_424: Profile = Profile {
    card_type: CardType::Felica424,
    defaults: &[
        (ConfigKey::Parity, 0),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 2),
        (ConfigKey::RxDataRate, 2),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::RxWaitUs, 12),
        (ConfigKey::TxWaitUs, 151),
        (ConfigKey::TimeoutUs, 1208),
    ],
    waveform: &[
        (Reg::TxAsk, 0x10),
        (Reg::ModWidth, 0x17),
        (Reg::RxThreshold, 0x35),
        (Reg::Demod, 0x4D),
    ],
};

static ISO15693: Profile = Profile {
    card_type: CardType::Iso15693,
    defaults: &[
        (ConfigKey::Parity, 0),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 4),
        (ConfigKey::RxDataRate, 4),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::Subcarrier, 0),
        (ConfigKey::RxWaitUs, 300),
        (ConfigKey::TxWaitUs, 500),
        (ConfigKey::TimeoutUs, 20000),
    ],
    waveform: &[
        (Reg::TxAsk, 0x00),
        (Reg::ModWidth, 0x2F),
        (Reg::RxThreshold, 0x2A),
        (Reg::Demod, 0x4C),
    ],
};

static ISO18000P3M3: Profile = Profile {
    card_type: CardType::Iso18000p3m3,
    defaults: &[
        (ConfigKey::Parity, 0),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 4),
        (ConfigKey::RxDataRate, 5),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::Subcarrier, 1),
        (ConfigKey::RxWaitUs, 200),
        (ConfigKey::TxWaitUs, 400),
        (ConfigKey::TimeoutUs, 20000),
    ],
    waveform: &[
        (Reg::TxAsk, 0x00),
        (Reg::ModWidth, 0x2F),
        (Reg::RxThreshold, 0x2A),
        (Reg::Demod, 0x4C),
    ],
};

static ISO18092: Profile = Profile {
    card_type: CardType::Iso18092,
    defaults: &[
        (ConfigKey::Parity, 1),
        (ConfigKey::TxCrc, 1),
        (ConfigKey::RxCrc, 1),
        (ConfigKey::TxDataRate, 0),
        (ConfigKey::RxDataRate, 0),
        (ConfigKey::TxLastBits, 0),
        (ConfigKey::RxAlign, 0),
        (ConfigKey::RxWaitUs, 76),
        (ConfigKey::TxWaitUs, 81),
        (ConfigKey::TimeoutMs, 100),
    ],
    waveform: &[
        (Reg::TxAsk, 0x40),
        (Reg::ModWidth, 0x26),
        (Reg::RxThreshold, 0x55),
        (Reg::Demod, 0x4D),
    ],
};

/// Profile table for a concrete technology. `CardType::Current` has no
/// profile; it re-applies the one in effect.
pub fn profile_for(card_type: CardType) -> Option<&'static Profile> {
    match card_type {
        CardType::Iso14443a => Some(&ISO14443A),
        CardType::Iso14443b => Some(&ISO14443B),
        CardType::Felica212 => Some(&FELICA_212),
        CardType::Felica424 => Some(&FELICA_424),
        CardType::Iso15693 => Some(&ISO15693),
        CardType::Iso18000p3m3 => Some(&ISO18000P3M3),
        CardType::Iso18092 => Some(&ISO18092),
        CardType::Current => None,
    }
}

impl Hal {
    /// Load the profile for `card_type` into the shadow and commit every
    /// entry to hardware.
    ///
    /// `CardType::Current` skips the default loading but still re-derives
    /// mode-dependent register state: any MIFARE Crypto1 authentication is
    /// cleared and the data-rate dependent registers are recommitted from
    /// the shadow.
    pub fn apply_protocol_settings(&mut self, card_type: CardType) -> Result<()> {
        debug!("apply protocol settings: {card_type}");
        self.active_mode = false;
        self.target_mode = TargetMode::Off;
        self.jewel_mode = false;
        self.shadow.store(ConfigKey::JewelMode, 0);
        self.set_config(ConfigKey::MfCrypto1, 0)?;

        if card_type == CardType::Current {
            let tx = self.shadow.fetch(ConfigKey::TxDataRate).unwrap_or(0);
            let rx = self.shadow.fetch(ConfigKey::RxDataRate).unwrap_or(0);
            self.set_config(ConfigKey::TxDataRate, tx)?;
            self.set_config(ConfigKey::RxDataRate, rx)?;
            return Ok(());
        }

        let profile = profile_for(card_type).ok_or_else(|| {
            Error::UnsupportedParameter(format!("no profile for card type {card_type}"))
        })?;
        self.card_type = card_type;
        for &(reg, value) in profile.waveform {
            self.dev.write(reg, value)?;
        }
        for &(key, value) in profile.defaults {
            self.set_config(key, value)?;
        }
        Ok(())
    }
}
