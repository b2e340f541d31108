#[path = "../common/mod.rs"]
mod common;

use common::{fixtures, helpers};
use nfchal::transceiver::{Events, Reg, SharedMock, bits};
use nfchal::{HalBuilder, ListenTech, TargetFraming, TargetMode, TxOptions};

// The ordering invariant of the shared tx/rx memory: bytes retained for a
// retransmission are never overwritten by incoming receive data.
#[test]
fn received_data_never_clobbers_the_retransmittable_frame() {
    let shared = SharedMock::new();
    let mut hal = HalBuilder::new()
        .with_transceiver(shared.boxed())
        .aliased_buffer(64)
        .build()
        .unwrap();
    hal.set_listen_parameters(&fixtures::sample_listen_params())
        .unwrap();

    // Activate as a passive 212 kbit/s target.
    shared.with(|m| {
        m.set_reg(Reg::Status1, bits::STATUS1_EXT_RF);
        m.push_activation(
            helpers::passive_target_status(1),
            &fixtures::felica_poll_frame(),
        );
    });
    let activation = hal.autocoll(ListenTech::PASSIVE_F).unwrap();
    assert_eq!(activation.framing, TargetFraming::Passive212);
    assert_eq!(
        hal.target_mode(),
        TargetMode::On(TargetFraming::Passive212)
    );

    // Answer the initiator, then receive its next frame into the same
    // memory block.
    let response = [0x12u8, 0x01, 0x2E, 0x3D, 0x4C, 0x5B, 0x6A, 0x79, 0x88];
    shared.with(|m| m.push_events(Events::TX_DONE));
    hal.transmit(TxOptions::default(), &response).unwrap();

    shared.with(|m| m.push_rx_frame(&[0x06, 0x00, 0x12, 0x34]));
    let received: Vec<u8> = hal.receive().unwrap().data.to_vec();
    assert_eq!(received, vec![0x06, 0x00, 0x12, 0x34]);

    // The initiator missed the answer: retransmit it unchanged.
    shared.with(|m| m.push_events(Events::TX_DONE));
    hal.transmit(TxOptions::retransmit_previous(), &[]).unwrap();

    let frames = shared.with(|m| m.sent_frames.clone());
    let retransmitted = frames.last().unwrap();
    let original = &frames[frames.len() - 2];
    assert_eq!(retransmitted, original);
    assert_eq!(retransmitted, &response.to_vec());
}
