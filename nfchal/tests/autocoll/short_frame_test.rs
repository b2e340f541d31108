#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::transceiver::{ChipCommand, Reg, bits};
use nfchal::{Error, ListenTech, TargetMode};

// An external Type A activation whose frame is shorter than the minimum
// valid length must fail with a protocol error and switch the device back
// to the normal (non-listening) command set.
#[test]
fn too_short_activating_frame_fails_and_leaves_listen_mode() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    shared.with(|m| {
        m.set_reg(Reg::Status1, bits::STATUS1_EXT_RF);
        m.push_activation(helpers::passive_target_status(0), &[0x26]);
    });

    let got = hal.autocoll(ListenTech::PASSIVE_A | ListenTech::PASSIVE_F);
    assert!(matches!(got, Err(Error::Protocol)));

    assert_eq!(shared.with(|m| m.reg(Reg::ListenMode)), 0);
    assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
    assert_eq!(hal.target_mode(), TargetMode::Off);
}
