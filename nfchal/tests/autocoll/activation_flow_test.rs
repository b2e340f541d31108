#[path = "../common/mod.rs"]
mod common;

use common::{fixtures, helpers};
use nfchal::transceiver::{Events, Reg, bits};
use nfchal::{ConfigKey, Error, ListenTech, TargetFraming, TxOptions};

// Full listen-mode lifecycle: program the listen parameters, activate as a
// Felica target, answer the poll, and confirm initiator-only operations are
// refused afterwards.
#[test]
fn felica_target_lifecycle() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.set_listen_parameters(&fixtures::sample_listen_params())
        .unwrap();

    shared.with(|m| {
        m.set_reg(Reg::Status1, bits::STATUS1_EXT_RF);
        m.push_activation(
            helpers::passive_target_status(2),
            &fixtures::felica_poll_frame(),
        );
    });
    let activation = hal.autocoll(ListenTech::PASSIVE_F).unwrap();
    assert_eq!(activation.framing, TargetFraming::Passive424);
    assert_eq!(activation.frame, fixtures::felica_poll_frame().as_slice());

    // CRC back on, shadow rates follow the negotiated speed.
    assert_eq!(hal.get_config(ConfigKey::TxCrc).unwrap(), 1);
    assert_eq!(hal.get_config(ConfigKey::RxCrc).unwrap(), 1);
    assert_eq!(hal.get_config(ConfigKey::RxDataRate).unwrap(), 2);

    // exchange is an initiator operation now
    assert!(matches!(
        hal.exchange(TxOptions::default(), &[0x00]),
        Err(Error::UseCondition(_))
    ));

    // but transmit/receive pace the target side
    shared.with(|m| m.push_events(Events::TX_DONE));
    hal.transmit(TxOptions::default(), &[0x12, 0x01]).unwrap();
    shared.with(|m| m.push_rx_frame(&[0x06, 0x00, 0xAA, 0xBB]));
    let next = hal.receive().unwrap();
    assert_eq!(next.data, &[0x06, 0x00, 0xAA, 0xBB]);
}

// Activation by an active-communication peer strips the start byte at
// 106 kbit/s and flips the instance into active mode.
#[test]
fn active_peer_activation() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    let mut frame = vec![0xF0];
    frame.extend_from_slice(&fixtures::atr_req_frame());
    shared.with(|m| {
        m.set_reg(Reg::Status1, bits::STATUS1_EXT_RF);
        m.push_activation(helpers::active_target_status(0), &frame);
    });

    let activation = hal
        .autocoll(ListenTech::ACTIVE_A | ListenTech::ACTIVE_F)
        .unwrap();
    assert_eq!(activation.framing, TargetFraming::Active106);
    assert_eq!(activation.frame, fixtures::atr_req_frame().as_slice());
    assert!(hal.is_active_mode());
}
