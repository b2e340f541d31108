// nfchal-rs/nfchal/src/autocoll/state.rs

//! States and pure transition guards of the activation engine. Everything
//! here is testable without a device.

use crate::transceiver::bits;
use crate::types::{DataRate, ListenTech, TargetFraming};
use crate::{Error, Result};

/// Engine states. The IO loop in the parent module walks these in order,
/// branching only for the recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Clear mode flags, abort any running command, flush the FIFO
    Reset,
    /// Program the listen-mode technology selection
    Program,
    /// Verify an external field is present before blocking
    FieldCheck,
    /// Arm the autonomous activation command
    Arm,
    /// Block for activation, fault or field loss
    Await,
    /// Drain and validate the activating frame
    Drain { framing: TargetFraming },
    /// Transient fault with passive state established: capture a retried
    /// frame with a plain receive
    Retry { framing: TargetFraming },
    /// Commit CRC, data rates and the target mode
    Finish { framing: TargetFraming },
}

/// Listen-mode register bits for a requested technology set.
///
/// Passive Type B is accepted in the bitmap but never programmed. A set
/// MIFARE-halted flag restricts listening to Type A regardless of the
/// request, so the device answers only a wake-up.
pub(crate) fn listen_mask(requested: ListenTech, mifare_halted: bool) -> u8 {
    if mifare_halted {
        return bits::LISTEN_A;
    }
    let mut mask = 0;
    if requested.contains(ListenTech::PASSIVE_A) {
        mask |= bits::LISTEN_A;
    }
    if requested.contains(ListenTech::PASSIVE_F) {
        mask |= bits::LISTEN_F;
    }
    if requested.contains(ListenTech::ACTIVE_A) {
        mask |= bits::LISTEN_ACTIVE_A;
    }
    if requested.contains(ListenTech::ACTIVE_F) {
        mask |= bits::LISTEN_ACTIVE_F;
    }
    mask
}

/// Decode the target-status register into the negotiated framing.
///
/// Active-communication activations are only valid when an active
/// technology was requested.
pub(crate) fn classify_activation(
    target_status: u8,
    requested: ListenTech,
) -> Result<TargetFraming> {
    if target_status & bits::TARGET_VALID == 0 {
        return Err(Error::Internal(
            "activation completed without a valid target status".to_string(),
        ));
    }
    let active = target_status & bits::TARGET_ACTIVE != 0;
    if active && !requested.any_active() {
        return Err(Error::Protocol);
    }
    let speed = DataRate::from_speed_bits(target_status & bits::TARGET_SPEED_MASK)
        .ok_or(Error::Protocol)?;
    match (active, speed) {
        (false, DataRate::R106) => Ok(TargetFraming::Passive106),
        (false, DataRate::R212) => Ok(TargetFraming::Passive212),
        (false, DataRate::R424) => Ok(TargetFraming::Passive424),
        (true, DataRate::R106) => Ok(TargetFraming::Active106),
        (true, DataRate::R212) => Ok(TargetFraming::Active212),
        (true, DataRate::R424) => Ok(TargetFraming::Active424),
        _ => Err(Error::Protocol),
    }
}

/// Leading bytes stripped off the activating frame for a framing. Active
/// 106 kbit/s frames carry the NFCIP start byte; everything else arrives
/// without framing bytes once the hardware removed the CRC.
pub(crate) fn strip_offset(framing: TargetFraming) -> usize {
    match framing {
        TargetFraming::Active106 => 1,
        _ => 0,
    }
}

/// Faults the engine may recover from without losing an established
/// passive activation.
pub(crate) fn is_transient(err: &Error) -> bool {
    matches!(err, Error::BufferOverflow | Error::Internal(_))
}
