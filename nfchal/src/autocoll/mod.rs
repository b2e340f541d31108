// nfchal-rs/nfchal/src/autocoll/mod.rs

//! Autocoll: autonomous listen-mode activation.
//!
//! The engine programs the requested listen technologies, arms the chip's
//! single activation command and reconciles its IRQ-driven outcome into a
//! technology-independent activation result. Passive and active
//! activations differ in field handling, framing stripping and in how
//! mid-activation faults are recovered.

mod state;

use log::debug;

use crate::constants::MIN_ACTIVATION_FRAME_LEN;
use crate::hal::Hal;
use crate::transceiver::{ChipCommand, Events, Reg, bits};
use crate::types::{Activation, ConfigKey, ListenTech, TargetFraming, TargetMode};
use crate::{Error, Result};

use state::State;

impl Hal {
    /// Enter listen mode and block until an external initiator activates
    /// this device as a target.
    ///
    /// A request for only passive Type B returns success immediately with an
    /// empty frame: the technology is accepted for interoperability with
    /// callers that set it unconditionally, but it is never listened for.
    pub fn autocoll(&mut self, requested: ListenTech) -> Result<Activation<'_>> {
        if requested.is_empty() {
            return Err(Error::InvalidParameter(
                "no listen technology requested".to_string(),
            ));
        }
        if requested == ListenTech::PASSIVE_B {
            debug!("autocoll: passive Type B only, reporting success without listening");
            return Ok(Activation {
                framing: TargetFraming::Passive106,
                frame: &[],
            });
        }
        let framing = self.autocoll_run(requested)?;
        Ok(Activation {
            framing,
            frame: self.arena.rx_frame_from(state::strip_offset(framing)),
        })
    }

    fn autocoll_run(&mut self, requested: ListenTech) -> Result<TargetFraming> {
        let mut st = State::Reset;
        loop {
            st = match st {
                State::Reset => {
                    self.active_mode = false;
                    self.target_mode = TargetMode::Off;
                    self.jewel_mode = false;
                    self.shadow.store(ConfigKey::JewelMode, 0);
                    self.dev.command(ChipCommand::Idle)?;
                    self.dev.flush_fifo()?;
                    self.dev.consume_events(
                        Events::ACTIVATED | Events::ERROR | Events::FIELD_OFF | Events::FIELD_ON,
                    )?;
                    State::Program
                }
                State::Program => {
                    let halted = self.shadow.fetch(ConfigKey::MifareHalted).unwrap_or(0) != 0;
                    let mask = state::listen_mask(requested, halted);
                    debug!("autocoll: listen mask {mask:#04x} (halted={halted})");
                    self.dev.write(Reg::ListenMode, mask)?;
                    State::FieldCheck
                }
                State::FieldCheck => {
                    if !self.external_field_present()? {
                        return Err(self.autocoll_fail(Error::ExternalRf));
                    }
                    State::Arm
                }
                State::Arm => {
                    self.dev.command(ChipCommand::Autocoll)?;
                    State::Await
                }
                State::Await => {
                    let ev = self
                        .dev
                        .wait_events(
                            Events::ACTIVATED | Events::ERROR | Events::FIELD_OFF,
                            &self.abort,
                        )
                        .map_err(|e| self.autocoll_fail(e))?;
                    if ev.contains(Events::ERROR) {
                        let err = self.classify_chip_error();
                        return Err(self.autocoll_fail(err));
                    }
                    if ev.contains(Events::FIELD_OFF) {
                        return Err(self.autocoll_fail(Error::ExternalRf));
                    }
                    if ev.contains(Events::ACTIVATED) {
                        let status = self.dev.read(Reg::TargetStatus)?;
                        let framing = state::classify_activation(status, requested)
                            .map_err(|e| self.autocoll_fail(e))?;
                        debug!("autocoll: activated, framing {framing}");
                        if framing.is_active() {
                            self.enable_active_profile()?;
                        }
                        State::Drain { framing }
                    } else if ev.contains(Events::TIMER) {
                        return Err(self.autocoll_fail(Error::IoTimeout));
                    } else {
                        State::Await
                    }
                }
                State::Drain { framing } => match self.drain_activation(framing) {
                    Ok(()) => State::Finish { framing },
                    Err(err) if state::is_transient(&err) && !framing.is_active() => {
                        debug!("autocoll: transient fault ({err}) with passive state; retrying");
                        State::Retry { framing }
                    }
                    Err(err) if framing.is_active() => {
                        self.wait_external_field_drop()
                            .map_err(|e| self.autocoll_fail(e))?;
                        return Err(self.autocoll_fail(err));
                    }
                    Err(err) => return Err(self.autocoll_fail(err)),
                },
                State::Retry { framing } => {
                    // The initiator retries its frame; target state is kept.
                    match self.receive_frame(true) {
                        Ok(_) => match self.validate_activation_frame(framing) {
                            Ok(()) => State::Finish { framing },
                            Err(err) => return Err(self.autocoll_fail(err)),
                        },
                        Err(err) => return Err(self.autocoll_fail(err)),
                    }
                }
                State::Finish { framing } => {
                    // CRC back on for the protocol exchanges that follow.
                    self.set_config(ConfigKey::TxCrc, 1)?;
                    self.set_config(ConfigKey::RxCrc, 1)?;
                    let rate = u16::from(framing.data_rate().speed_bits());
                    self.set_config(ConfigKey::TxDataRate, rate)?;
                    self.set_config(ConfigKey::RxDataRate, rate)?;
                    self.target_mode = TargetMode::On(framing);
                    return Ok(framing);
                }
            };
        }
    }

    /// Pull the activating frame out of the FIFO and validate it.
    fn drain_activation(&mut self, framing: TargetFraming) -> Result<()> {
        self.arena.reset_rx();
        self.drain_rx_fifo()?;
        self.validate_activation_frame(framing)
    }

    fn validate_activation_frame(&mut self, framing: TargetFraming) -> Result<()> {
        let stripped = self
            .arena
            .rx_len()
            .saturating_sub(state::strip_offset(framing));
        if stripped < MIN_ACTIVATION_FRAME_LEN {
            return Err(Error::Protocol);
        }
        // Residual collision/incomplete-byte state of the activating frame.
        let control = self.dev.read(Reg::Control)?;
        self.shadow.store(
            ConfigKey::RxLastBits,
            u16::from(control & bits::CONTROL_RX_BITS_MASK),
        );
        Ok(())
    }

    /// The peer activated us with its own carrier off and ours auto-enabled:
    /// switch to active-communication operation.
    fn enable_active_profile(&mut self) -> Result<()> {
        self.active_mode = true;
        self.dev.set_bits(Reg::TxControl, bits::TXCONTROL_AUTO_RFCA)
    }

    /// Active-communication failure path: hold off until the peer's field
    /// drops so the caller can restart the engine cleanly.
    fn wait_external_field_drop(&mut self) -> Result<()> {
        loop {
            if !self.external_field_present()? {
                return Ok(());
            }
            let ev = self.dev.wait_events(Events::FIELD_OFF, &self.abort)?;
            if ev.intersects(Events::FIELD_OFF | Events::TIMER) {
                return Ok(());
            }
        }
    }

    /// Leave listen mode and reset to the normal command set.
    fn autocoll_fail(&mut self, err: Error) -> Error {
        let _ = self.dev.write(Reg::ListenMode, 0);
        self.target_mode = TargetMode::Off;
        self.active_mode = false;
        self.fail_reset(err)
    }
}
