// nfchal-rs/nfchal/src/hal/mifare.rs

//! MIFARE Classic authentication through the chip's Crypto1 unit.

use log::debug;

use crate::hal::Hal;
use crate::transceiver::{ChipCommand, Events, Reg, bits};
use crate::types::{CardType, ConfigKey, MifareKey, MifareKeyType};
use crate::{Error, Result};

impl Hal {
    /// Authenticate a MIFARE Classic block with an explicit key.
    ///
    /// On success the Crypto1 unit stays enabled for the following
    /// exchanges; it is cleared by `apply_protocol_settings` or by writing
    /// 0 to [`ConfigKey::MfCrypto1`].
    pub fn authenticate_mifare(
        &mut self,
        block: u8,
        key_type: MifareKeyType,
        key: &MifareKey,
        uid: &[u8; 4],
    ) -> Result<()> {
        if self.card_type != CardType::Iso14443a {
            return Err(Error::UseCondition(format!(
                "MIFARE authentication requires the Type A profile, current is {}",
                self.card_type
            )));
        }
        if self.target_mode.is_on() {
            return Err(Error::UseCondition(
                "MIFARE authentication is an initiator operation".to_string(),
            ));
        }

        debug!("mifare authenticate block {block} ({key_type:?})");
        let mut params = Vec::with_capacity(12);
        params.push(key_type.command_code());
        params.push(block);
        params.extend_from_slice(key.as_bytes());
        params.extend_from_slice(uid);

        self.dev.flush_fifo().map_err(|e| self.fail_reset(e))?;
        self.dev
            .write_fifo(&params)
            .map_err(|e| self.fail_reset(e))?;
        self.dev
            .command(ChipCommand::MifareAuthent)
            .map_err(|e| self.fail_reset(e))?;

        loop {
            let ev = self
                .dev
                .wait_events(Events::IDLE | Events::ERROR | Events::TIMER, &self.abort)
                .map_err(|e| self.fail_reset(e))?;
            if ev.contains(Events::ERROR) {
                let err = self.classify_chip_error();
                return Err(self.fail_reset(err));
            }
            if ev.contains(Events::IDLE) {
                break;
            }
            if ev.contains(Events::TIMER) {
                return Err(self.fail_reset(Error::IoTimeout));
            }
        }

        let status = self.dev.read(Reg::Status1).map_err(|e| self.fail_reset(e))?;
        if status & bits::STATUS1_CRYPTO1_ON == 0 {
            return Err(self.fail_reset(Error::Authentication));
        }
        self.shadow.store(ConfigKey::MfCrypto1, 1);
        Ok(())
    }

    /// Authenticate with key material resolved from the installed key
    /// store.
    pub fn authenticate_mifare_stored(
        &mut self,
        block: u8,
        key_type: MifareKeyType,
        key_no: u16,
        key_version: u16,
        uid: &[u8; 4],
    ) -> Result<()> {
        let store = self.key_store.as_ref().ok_or_else(|| {
            Error::UseCondition("no key store installed on this instance".to_string())
        })?;
        let key = store.mifare_key(key_no, key_version)?;
        self.authenticate_mifare(block, key_type, &key, uid)
    }
}
