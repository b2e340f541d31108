#[path = "../common/mod.rs"]
mod common;

use common::{fixtures, helpers};
use nfchal::transceiver::{Events, Reg, bits};
use nfchal::{CardType, ConfigKey, TxOptions};

// Survey a Type A card: apply the profile, raise the field, exchange REQA
// and expect the two ATQA bytes back with CRC still disabled for the
// anti-collision phase.
#[test]
fn reqa_atqa_roundtrip() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.apply_protocol_settings(CardType::Iso14443a).unwrap();
    hal.field_on().unwrap();
    shared.with(|m| {
        m.push_events(Events::TX_DONE);
        m.push_rx_frame(&fixtures::ATQA);
    });

    let resp = hal.exchange(TxOptions::default(), &fixtures::REQA).unwrap();
    assert_eq!(resp.data, &fixtures::ATQA);
    assert_eq!(resp.data.len(), 2);
    assert!(resp.is_complete());

    // REQA-phase profile: CRC off in the shadow and in hardware, parity on.
    assert_eq!(hal.get_config(ConfigKey::TxCrc).unwrap(), 0);
    assert_eq!(hal.get_config(ConfigKey::RxCrc).unwrap(), 0);
    assert_eq!(hal.get_config(ConfigKey::Parity).unwrap(), 1);
    assert_eq!(shared.with(|m| m.reg(Reg::TxMode)) & bits::TXMODE_CRC_EN, 0);
    assert_eq!(shared.with(|m| m.reg(Reg::RxMode)) & bits::RXMODE_CRC_EN, 0);

    // The survey went out unmodified.
    assert_eq!(
        shared.with(|m| m.sent_frames.last().cloned()),
        Some(fixtures::REQA.to_vec())
    );
}

#[test]
fn field_stays_up_for_follow_up_exchanges() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.apply_protocol_settings(CardType::Iso14443a).unwrap();
    hal.field_on().unwrap();
    shared.with(|m| {
        m.push_events(Events::TX_DONE);
        m.push_rx_frame(&fixtures::ATQA);
    });
    let _ = hal.exchange(TxOptions::default(), &fixtures::REQA).unwrap();

    let control = shared.with(|m| m.reg(Reg::TxControl));
    assert_ne!(control & (bits::TXCONTROL_TX1 | bits::TXCONTROL_TX2), 0);
}
