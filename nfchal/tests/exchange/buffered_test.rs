#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::transceiver::{ChipCommand, Events};
use nfchal::{CardType, Error, TxOptions};

#[test]
fn buffered_chunks_send_as_one_frame() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.apply_protocol_settings(CardType::Iso14443a).unwrap();

    hal.transmit(TxOptions::buffered(), &[0x93, 0x70]).unwrap();
    hal.transmit(TxOptions::buffered(), &[0x01, 0x02, 0x03, 0x04])
        .unwrap();
    assert!(
        !shared.with(|m| m.commands.contains(&ChipCommand::Transmit)),
        "buffered chunks must not start a transmission"
    );

    shared.with(|m| {
        m.push_events(Events::TX_DONE);
        m.push_rx_frame(&[0x08, 0xB6, 0xDD]);
    });
    let resp = hal.exchange(TxOptions::default(), &[0xBB]).unwrap();
    assert_eq!(resp.data, &[0x08, 0xB6, 0xDD]);
    assert_eq!(
        shared.with(|m| m.sent_frames.last().cloned()),
        Some(vec![0x93, 0x70, 0x01, 0x02, 0x03, 0x04, 0xBB])
    );
}

// After a failed call the transmit buffer must be empty: the next frame
// carries only its own bytes.
#[test]
fn failed_call_empties_the_transmit_buffer() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.apply_protocol_settings(CardType::Iso14443a).unwrap();

    hal.transmit(TxOptions::buffered(), &[0xDE, 0xAD]).unwrap();
    // no scripted events: the send times out
    assert!(matches!(
        hal.transmit(TxOptions::default(), &[0xBE]),
        Err(Error::IoTimeout)
    ));

    shared.with(|m| m.push_events(Events::TX_DONE));
    hal.transmit(TxOptions::default(), &[0x52]).unwrap();
    assert_eq!(
        shared.with(|m| m.sent_frames.last().cloned()),
        Some(vec![0x52])
    );
}
