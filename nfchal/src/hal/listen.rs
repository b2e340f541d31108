// nfchal-rs/nfchal/src/hal/listen.rs

//! Listen-parameter loader: programs the identification and response data
//! the chip answers with during autonomous activation.

use log::debug;

use crate::hal::Hal;
use crate::transceiver::ChipCommand;
use crate::types::ListenParams;
use crate::{Error, Result};

impl Hal {
    /// Load SENS_RES, NFCID1, SEL_RES, the Felica polling response and
    /// NFCID3 into the chip. Must be called before `autocoll`; reprogramming
    /// while a target is activated is refused.
    pub fn set_listen_parameters(&mut self, params: &ListenParams) -> Result<()> {
        if self.target_mode.is_on() {
            return Err(Error::UseCondition(
                "listen parameters cannot change while a target is activated".to_string(),
            ));
        }
        let bytes = params.serialize();
        debug!("load listen parameters ({} bytes)", bytes.len());
        self.dev.flush_fifo().map_err(|e| self.fail_reset(e))?;
        let written = self
            .dev
            .write_fifo(&bytes)
            .map_err(|e| self.fail_reset(e))?;
        if written != bytes.len() {
            return Err(self.fail_reset(Error::BufferOverflow));
        }
        self.dev
            .command(ChipCommand::Configure)
            .map_err(|e| self.fail_reset(e))
    }
}
