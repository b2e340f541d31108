// nfchal-rs/nfchal/src/hal/field.rs

//! RF carrier lifecycle: field on/off and the off-wait-on-wait reset cycle.

use log::debug;

use crate::constants::{DEFAULT_FIELD_OFF_MS, DEFAULT_FIELD_RECOVERY_MS};
use crate::hal::Hal;
use crate::transceiver::{Reg, bits};
use crate::types::{ConfigKey, TimeUnit};
use crate::{Error, Result};

impl Hal {
    /// Enable the antenna drivers.
    ///
    /// In active-communication mode the transmitter performs RF collision
    /// avoidance first; an external field still present at that point fails
    /// with an RF error and the drivers stay off.
    pub fn field_on(&mut self) -> Result<()> {
        debug!("field on");
        let mut mask = bits::TXCONTROL_TX1 | bits::TXCONTROL_TX2;
        if self.active_mode {
            let status = self.dev.read(Reg::Status1)?;
            if status & bits::STATUS1_EXT_RF != 0 {
                return Err(Error::ExternalRf);
            }
            mask |= bits::TXCONTROL_INITIAL_RFCA;
        }
        self.dev.set_bits(Reg::TxControl, mask)
    }

    /// Disable all antenna drivers, including any collision-avoidance
    /// automation left over from peer-to-peer modes.
    pub fn field_off(&mut self) -> Result<()> {
        debug!("field off");
        self.dev.clear_bits(
            Reg::TxControl,
            bits::TXCONTROL_TX1
                | bits::TXCONTROL_TX2
                | bits::TXCONTROL_INITIAL_RFCA
                | bits::TXCONTROL_AUTO_RFCA,
        )
    }

    /// Field reset: off, wait the configured field-off time, on, wait the
    /// configured recovery time.
    pub fn field_reset(&mut self) -> Result<()> {
        let off_ms = self
            .shadow
            .fetch(ConfigKey::FieldOffTimeMs)
            .unwrap_or(DEFAULT_FIELD_OFF_MS);
        let recovery_ms = self
            .shadow
            .fetch(ConfigKey::FieldRecoveryTimeMs)
            .unwrap_or(DEFAULT_FIELD_RECOVERY_MS);
        self.field_off()?;
        self.wait(TimeUnit::Milliseconds, u32::from(off_ms))?;
        self.field_on()?;
        self.wait(TimeUnit::Milliseconds, u32::from(recovery_ms))
    }

    /// Whether the external-field-detect condition is present.
    pub(crate) fn external_field_present(&mut self) -> Result<bool> {
        let status = self.dev.read(Reg::Status1)?;
        Ok(status & bits::STATUS1_EXT_RF != 0)
    }
}
