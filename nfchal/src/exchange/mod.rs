// nfchal-rs/nfchal/src/exchange/mod.rs

//! RF frame exchange engine: transmit, receive and their composition.
//!
//! The engine drives the half-duplex transceiver through its FIFO and
//! interrupt events. One frame moves per operation; buffering options let
//! callers assemble a frame from chunks before it goes out.

pub mod buffer;

use log::{debug, trace};

use crate::constants::NFCIP_START_BYTE;
use crate::hal::Hal;
use crate::transceiver::{ChipCommand, Events, Reg, bits};
use crate::types::{CardType, ConfigKey, DataRate, Received, TargetFraming, TargetMode, TxOptions};
use crate::{Error, Result};

/// Byte source of a transmission.
enum TxSource {
    /// The pending transmit buffer
    Pending,
    /// The retained previous frame (retransmission)
    LastFrame,
}

/// Internal receive outcome; the public view is built from the arena.
pub(crate) struct RxOutcome {
    pub valid_bits: Option<u8>,
}

impl Hal {
    /// Transmit `data`, together with any previously buffered chunks.
    ///
    /// With [`TxOptions::buffered`] the chunk is appended to the transmit
    /// buffer and nothing is sent. With [`TxOptions::retransmit_previous`]
    /// the previously transmitted frame is resent unchanged; this is only
    /// valid once a target has been activated.
    pub fn transmit(&mut self, options: TxOptions, data: &[u8]) -> Result<()> {
        if options.retransmit {
            if !data.is_empty() {
                return Err(Error::InvalidParameter(
                    "a retransmission takes no new data".to_string(),
                ));
            }
            if !self.target_mode.is_on() {
                return Err(Error::UseCondition(
                    "retransmission requires an activated target".to_string(),
                ));
            }
            if self.arena.last_frame().is_empty() {
                return Err(Error::UseCondition(
                    "no previous frame available for retransmission".to_string(),
                ));
            }
            return self.send_frame(ChipCommand::Transmit, TxSource::LastFrame);
        }
        self.arena.append_tx(data)?;
        if options.buffer_only {
            trace!("buffered {} bytes, {} pending", data.len(), self.arena.tx_len());
            return Ok(());
        }
        self.send_frame(ChipCommand::Transmit, TxSource::Pending)
    }

    /// Block until a frame arrives or the configured timeout expires.
    pub fn receive(&mut self) -> Result<Received<'_>> {
        let outcome = self.receive_frame(true)?;
        Ok(Received {
            data: self.arena.rx_frame(),
            valid_bits: outcome.valid_bits,
        })
    }

    /// Transmit then receive in one half-duplex turn.
    ///
    /// Not available once a target mode is active; activated targets must
    /// pace `transmit`/`receive` themselves.
    pub fn exchange(&mut self, options: TxOptions, data: &[u8]) -> Result<Received<'_>> {
        if self.target_mode.is_on() {
            return Err(Error::UseCondition(
                "exchange is not available while a target is activated".to_string(),
            ));
        }
        if options.retransmit {
            return Err(Error::UseCondition(
                "retransmission is a transmit-only option".to_string(),
            ));
        }
        self.arena.append_tx(data)?;
        if options.buffer_only {
            return Ok(Received {
                data: &[],
                valid_bits: None,
            });
        }
        self.send_frame(ChipCommand::Transceive, TxSource::Pending)?;
        let outcome = self.receive_frame(false)?;
        Ok(Received {
            data: self.arena.rx_frame(),
            valid_bits: outcome.valid_bits,
        })
    }

    /// Whether outgoing frames carry the NFCIP start byte: passive
    /// 106 kbit/s peer-to-peer framing, as initiator or activated target.
    fn needs_start_byte(&self) -> bool {
        match self.target_mode {
            TargetMode::On(framing) => framing == TargetFraming::Passive106,
            TargetMode::Off => {
                self.card_type == CardType::Iso18092
                    && self.tx_data_rate() == DataRate::R106
                    && !self.active_mode
            }
        }
    }

    fn send_frame(&mut self, cmd: ChipCommand, source: TxSource) -> Result<()> {
        if self.active_mode {
            self.prepare_active_field()?;
        }

        let mut frame = Vec::with_capacity(self.arena.tx_len() + 1);
        if self.needs_start_byte() {
            frame.push(NFCIP_START_BYTE);
        }
        match source {
            TxSource::Pending => frame.extend_from_slice(self.arena.tx_pending()),
            TxSource::LastFrame => frame.extend_from_slice(self.arena.last_frame()),
        }
        debug!("transmit {} bytes ({cmd:?})", frame.len());

        self.dev.flush_fifo().map_err(|e| self.fail_reset(e))?;
        let mut written = self
            .dev
            .write_fifo(&frame)
            .map_err(|e| self.fail_reset(e))?;
        self.dev.command(cmd).map_err(|e| self.fail_reset(e))?;

        let mut wanted = Events::TX_DONE | Events::ERROR | Events::TIMER;
        if self.target_mode.is_on() || self.active_mode {
            wanted |= Events::FIELD_OFF;
        }
        loop {
            let mut round = wanted;
            if written < frame.len() {
                round |= Events::FIFO_LOW;
            }
            let ev = self
                .dev
                .wait_events(round, &self.abort)
                .map_err(|e| self.fail_reset(e))?;
            if ev.contains(Events::ERROR) {
                let err = self.classify_chip_error();
                return Err(self.fail_reset(err));
            }
            if ev.contains(Events::FIELD_OFF) {
                return Err(self.fail_reset(Error::ExternalRf));
            }
            if ev.contains(Events::FIFO_LOW) && written < frame.len() {
                written += self
                    .dev
                    .write_fifo(&frame[written..])
                    .map_err(|e| self.fail_reset(e))?;
                continue;
            }
            if ev.contains(Events::TX_DONE) {
                if written < frame.len() {
                    return Err(self.fail_reset(Error::Internal(
                        "transmitter finished before the frame was fully loaded".to_string(),
                    )));
                }
                break;
            }
            if ev.contains(Events::TIMER) {
                return Err(self.fail_reset(Error::IoTimeout));
            }
        }

        if matches!(source, TxSource::Pending) {
            self.arena.mark_sent();
        }
        Ok(())
    }

    /// In active-communication mode the internal field alternates with the
    /// peer's: an unexpected external field is a collision, and a dropped
    /// internal field is re-established with an off/on toggle.
    fn prepare_active_field(&mut self) -> Result<()> {
        let status = self.dev.read(Reg::Status1).map_err(|e| self.fail_reset(e))?;
        if status & bits::STATUS1_EXT_RF != 0 {
            return Err(self.fail_reset(Error::ExternalRf));
        }
        let drivers = bits::TXCONTROL_TX1 | bits::TXCONTROL_TX2;
        let control = self
            .dev
            .read(Reg::TxControl)
            .map_err(|e| self.fail_reset(e))?;
        if control & drivers != drivers {
            self.field_off()?;
            self.field_on()?;
        }
        Ok(())
    }

    pub(crate) fn receive_frame(&mut self, issue_command: bool) -> Result<RxOutcome> {
        self.arena.reset_rx();
        if issue_command {
            self.dev.flush_fifo().map_err(|e| self.fail_reset(e))?;
            self.dev
                .command(ChipCommand::Receive)
                .map_err(|e| self.fail_reset(e))?;
        }

        let mut wanted = Events::RX_DONE | Events::FIFO_HIGH | Events::TIMER | Events::ERROR;
        if self.target_mode.is_on() || self.active_mode {
            wanted |= Events::FIELD_OFF;
        }
        loop {
            let ev = self
                .dev
                .wait_events(wanted, &self.abort)
                .map_err(|e| self.fail_reset(e))?;
            if ev.contains(Events::ERROR) {
                let err = self.classify_chip_error();
                return Err(self.fail_reset(err));
            }
            if ev.contains(Events::FIELD_OFF) {
                return Err(self.fail_reset(Error::ExternalRf));
            }
            if ev.contains(Events::RX_DONE) {
                self.drain_rx_fifo().map_err(|e| self.fail_reset(e))?;
                return self.finish_rx();
            }
            if ev.contains(Events::FIFO_HIGH) {
                self.drain_rx_fifo().map_err(|e| self.fail_reset(e))?;
                continue;
            }
            if ev.contains(Events::TIMER) {
                let err = self.fail_reset(Error::IoTimeout);
                if !self.target_mode.is_on()
                    && self.shadow.fetch(ConfigKey::RfResetAfterTimeout).unwrap_or(0) != 0
                {
                    let _ = self.field_reset();
                }
                return Err(err);
            }
        }
    }

    /// Move everything the FIFO holds into the receive region.
    pub(crate) fn drain_rx_fifo(&mut self) -> Result<()> {
        let mut buf = [0u8; 64];
        loop {
            let level = self.dev.fifo_level()?;
            if level == 0 {
                return Ok(());
            }
            let cap = buf.len();
            let n = self.dev.read_fifo(&mut buf[..level.min(cap)])?;
            if n == 0 {
                return Ok(());
            }
            self.arena.rx_write(&buf[..n])?;
        }
    }

    fn finish_rx(&mut self) -> Result<RxOutcome> {
        let flags = self
            .dev
            .read(Reg::ErrorFlags)
            .map_err(|e| self.fail_reset(e))?;
        if flags != 0 {
            let err = self.classify_error_flags(flags);
            return Err(self.fail_reset(err));
        }
        if self.arena.rx_len() == 0 {
            return Err(self.fail_reset(Error::Framing));
        }
        let valid_bits = self
            .dev
            .read(Reg::Control)
            .map_err(|e| self.fail_reset(e))?
            & bits::CONTROL_RX_BITS_MASK;
        self.shadow
            .store(ConfigKey::RxLastBits, u16::from(valid_bits));
        trace!(
            "received {} bytes, valid bits {}",
            self.arena.rx_len(),
            valid_bits
        );
        Ok(RxOutcome {
            valid_bits: (valid_bits != 0).then_some(valid_bits),
        })
    }

    /// Read the latched fault flags and classify them.
    pub(crate) fn classify_chip_error(&mut self) -> Error {
        match self.dev.read(Reg::ErrorFlags) {
            Ok(flags) => self.classify_error_flags(flags),
            Err(e) => e,
        }
    }

    /// Map latched fault flags onto the error taxonomy. Transport faults
    /// outrank RF faults, which outrank frame-level conditions.
    pub(crate) fn classify_error_flags(&mut self, flags: u8) -> Error {
        if flags & bits::ERR_WR != 0 {
            Error::ReadWrite
        } else if flags & bits::ERR_TEMP != 0 {
            Error::Temperature
        } else if flags & bits::ERR_RF != 0 {
            Error::ExternalRf
        } else if flags & bits::ERR_FIFO_OVFL != 0 {
            Error::BufferOverflow
        } else if flags & bits::ERR_COLL != 0 {
            let bit_position = self.dev.read(Reg::CollPos).map(u16::from).unwrap_or(0);
            let valid_bits = self
                .dev
                .read(Reg::Control)
                .map(|v| v & bits::CONTROL_RX_BITS_MASK)
                .unwrap_or(0);
            self.shadow
                .store(ConfigKey::RxLastBits, u16::from(valid_bits));
            Error::Collision {
                bit_position,
                valid_bits,
            }
        } else if flags & (bits::ERR_CRC | bits::ERR_PARITY) != 0 {
            Error::Integrity
        } else if flags & bits::ERR_PROTOCOL != 0 {
            Error::Protocol
        } else {
            Error::Internal(format!("unclassified error flags {flags:#04x}"))
        }
    }

    /// Reset to the idle command state after a failed operation: cancel the
    /// running command, flush the FIFO and drop pending transmit bytes.
    /// Secondary faults on this best-effort path are not reported.
    pub(crate) fn fail_reset(&mut self, err: Error) -> Error {
        debug!("operation failed ({err}); resetting to idle");
        let _ = self.dev.command(ChipCommand::Idle);
        let _ = self.dev.flush_fifo();
        self.arena.reset_tx();
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::Hal;
    use crate::transceiver::{ScriptStep, SharedMock};

    fn mock_hal() -> (Hal, SharedMock) {
        let shared = SharedMock::new();
        let hal = Hal::new(shared.boxed()).unwrap();
        (hal, shared)
    }

    #[test]
    fn buffered_transmit_never_sends() {
        let (mut hal, shared) = mock_hal();
        hal.transmit(TxOptions::buffered(), &[0x93, 0x20]).unwrap();
        assert!(shared.with(|m| m.sent_frames.is_empty()));
        assert!(!shared.with(|m| m.commands.contains(&ChipCommand::Transmit)));
        assert_eq!(hal.arena.tx_len(), 2);
    }

    #[test]
    fn transmit_sends_concatenation_of_buffered_chunks() {
        let (mut hal, shared) = mock_hal();
        hal.transmit(TxOptions::buffered(), &[0x01, 0x02]).unwrap();
        hal.transmit(TxOptions::buffered(), &[0x03]).unwrap();
        shared.with(|m| m.push_events(Events::TX_DONE));
        hal.transmit(TxOptions::default(), &[0x04, 0x05]).unwrap();
        assert_eq!(
            shared.with(|m| m.sent_frames.last().cloned()),
            Some(vec![0x01, 0x02, 0x03, 0x04, 0x05])
        );
        // pending buffer emptied, frame retained for retransmission
        assert_eq!(hal.arena.tx_len(), 0);
        assert_eq!(hal.arena.last_frame(), &[0x01, 0x02, 0x03, 0x04, 0x05]);
    }

    #[test]
    fn p2p_passive_106_prepends_start_byte() {
        let (mut hal, shared) = mock_hal();
        hal.apply_protocol_settings(CardType::Iso18092).unwrap();
        shared.with(|m| m.push_events(Events::TX_DONE));
        hal.transmit(TxOptions::default(), &[0xD4, 0x00]).unwrap();
        assert_eq!(
            shared.with(|m| m.sent_frames.last().cloned()),
            Some(vec![NFCIP_START_BYTE, 0xD4, 0x00])
        );
    }

    #[test]
    fn transmit_overflow_resets_buffer() {
        let shared = SharedMock::new();
        let mut hal = crate::hal::HalBuilder::new()
            .with_transceiver(shared.boxed())
            .buffer_sizes(4, 4)
            .build()
            .unwrap();
        assert!(matches!(
            hal.transmit(TxOptions::buffered(), &[0; 5]),
            Err(Error::BufferOverflow)
        ));
        assert_eq!(hal.arena.tx_len(), 0);
    }

    #[test]
    fn watermark_refill_streams_large_frames() {
        let shared = SharedMock::from_mock(
            crate::transceiver::MockTransceiver::new().with_fifo_capacity(4),
        );
        let mut hal = Hal::new(shared.boxed()).unwrap();
        shared.with(|m| {
            m.push_events(Events::FIFO_LOW);
            m.push_events(Events::TX_DONE);
        });
        let frame: Vec<u8> = (0..10).collect();
        hal.transmit(TxOptions::default(), &frame).unwrap();
        assert_eq!(shared.with(|m| m.sent_frames.last().cloned()), Some(frame));
    }

    #[test]
    fn transmit_timeout_resets_to_idle() {
        let (mut hal, shared) = mock_hal();
        // no scripted events: the wait reports a timer expiry
        assert!(matches!(
            hal.transmit(TxOptions::default(), &[0x26]),
            Err(Error::IoTimeout)
        ));
        assert_eq!(hal.arena.tx_len(), 0);
        assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    }

    #[test]
    fn receive_classifies_collision_with_position() {
        let (mut hal, shared) = mock_hal();
        shared.with(|m| {
            m.push_step(
                ScriptStep::events(Events::ERROR)
                    .with_reg(Reg::ErrorFlags, bits::ERR_COLL)
                    .with_reg(Reg::CollPos, 37)
                    .with_reg(Reg::Control, 0x05),
            );
        });
        match hal.receive() {
            Err(Error::Collision {
                bit_position,
                valid_bits,
            }) => {
                assert_eq!(bit_position, 37);
                assert_eq!(valid_bits, 5);
            }
            other => panic!("expected collision, got {other:?}"),
        }
        assert_eq!(hal.get_config(ConfigKey::RxLastBits).unwrap(), 5);
        assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    }

    #[test]
    fn receive_classifies_integrity_and_protocol() {
        let (mut hal, shared) = mock_hal();
        shared.with(|m| {
            m.push_step(ScriptStep::events(Events::ERROR).with_reg(Reg::ErrorFlags, bits::ERR_CRC));
        });
        assert!(matches!(hal.receive(), Err(Error::Integrity)));

        shared.with(|m| {
            m.push_step(
                ScriptStep::events(Events::ERROR).with_reg(Reg::ErrorFlags, bits::ERR_PROTOCOL),
            );
        });
        assert!(matches!(hal.receive(), Err(Error::Protocol)));
    }

    #[test]
    fn incomplete_byte_is_success_without_reset() {
        let (mut hal, shared) = mock_hal();
        shared.with(|m| {
            m.push_step(
                ScriptStep::events(Events::RX_DONE)
                    .with_fifo(&[0x0F])
                    .with_reg(Reg::Control, 0x04),
            );
        });
        let got = hal.receive().unwrap();
        assert_eq!(got.data, &[0x0F]);
        assert_eq!(got.valid_bits, Some(4));
        assert!(!got.is_complete());
        assert_eq!(hal.get_config(ConfigKey::RxLastBits).unwrap(), 4);
        // no idle reset on the incomplete-byte success path
        assert_ne!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    }

    #[test]
    fn empty_frame_is_framing_error() {
        let (mut hal, shared) = mock_hal();
        shared.with(|m| m.push_events(Events::RX_DONE));
        assert!(matches!(hal.receive(), Err(Error::Framing)));
    }

    #[test]
    fn rx_overflow_drains_to_buffer_overflow() {
        let shared = SharedMock::new();
        let mut hal = crate::hal::HalBuilder::new()
            .with_transceiver(shared.boxed())
            .buffer_sizes(8, 2)
            .build()
            .unwrap();
        shared.with(|m| m.push_rx_frame(&[1, 2, 3, 4]));
        assert!(matches!(hal.receive(), Err(Error::BufferOverflow)));
        assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    }

    #[test]
    fn timeout_triggers_configured_field_reset() {
        let (mut hal, shared) = mock_hal();
        hal.set_config(ConfigKey::RfResetAfterTimeout, 1).unwrap();
        let waits_before = shared.with(|m| m.wait_calls);
        assert!(matches!(hal.receive(), Err(Error::IoTimeout)));
        // timeout wait plus the two field-reset waits
        assert!(shared.with(|m| m.wait_calls) >= waits_before + 3);
        let control = shared.with(|m| m.reg(Reg::TxControl));
        assert_ne!(control & (bits::TXCONTROL_TX1 | bits::TXCONTROL_TX2), 0);
    }

    #[test]
    fn exchange_round_trip() {
        let (mut hal, shared) = mock_hal();
        hal.apply_protocol_settings(CardType::Iso14443a).unwrap();
        shared.with(|m| {
            m.push_events(Events::TX_DONE);
            m.push_rx_frame(&[0x04, 0x00]);
        });
        let got = hal.exchange(TxOptions::default(), &[0x26]).unwrap();
        assert_eq!(got.data, &[0x04, 0x00]);
        assert!(got.is_complete());
        assert_eq!(
            shared.with(|m| m.sent_frames.last().cloned()),
            Some(vec![0x26])
        );
        // transceive, not separate transmit/receive strobes
        assert!(shared.with(|m| m.commands.contains(&ChipCommand::Transceive)));
    }

    #[test]
    fn exchange_refused_in_target_mode() {
        let (mut hal, _shared) = mock_hal();
        hal.target_mode = TargetMode::On(TargetFraming::Passive212);
        assert!(matches!(
            hal.exchange(TxOptions::default(), &[0x00]),
            Err(Error::UseCondition(_))
        ));
    }

    #[test]
    fn retransmit_requires_activated_target() {
        let (mut hal, shared) = mock_hal();
        assert!(matches!(
            hal.transmit(TxOptions::retransmit_previous(), &[]),
            Err(Error::UseCondition(_))
        ));

        // activate and send once, then retransmission resends the same bytes
        hal.target_mode = TargetMode::On(TargetFraming::Passive212);
        shared.with(|m| {
            m.push_events(Events::TX_DONE);
            m.push_events(Events::TX_DONE);
        });
        hal.transmit(TxOptions::default(), &[0xAB, 0xCD]).unwrap();
        hal.transmit(TxOptions::retransmit_previous(), &[]).unwrap();
        let frames = shared.with(|m| m.sent_frames.clone());
        assert_eq!(frames[frames.len() - 2], frames[frames.len() - 1]);
    }

    #[test]
    fn active_mode_rejects_unexpected_external_field() {
        let (mut hal, shared) = mock_hal();
        hal.active_mode = true;
        shared.with(|m| m.set_reg(Reg::Status1, bits::STATUS1_EXT_RF));
        assert!(matches!(
            hal.transmit(TxOptions::default(), &[0x00]),
            Err(Error::ExternalRf)
        ));
    }

    #[test]
    fn active_mode_toggles_field_before_transmit() {
        let (mut hal, shared) = mock_hal();
        hal.active_mode = true;
        shared.with(|m| m.push_events(Events::TX_DONE));
        hal.transmit(TxOptions::default(), &[0xD4]).unwrap();
        let control = shared.with(|m| m.reg(Reg::TxControl));
        assert_ne!(control & (bits::TXCONTROL_TX1 | bits::TXCONTROL_TX2), 0);
    }

    #[test]
    fn aborted_receive_is_idle() {
        let (mut hal, shared) = mock_hal();
        hal.abort_handle().post();
        assert!(matches!(hal.receive(), Err(Error::Aborted)));
        assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    }
}
