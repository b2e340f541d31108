// fixtures.rs — commonly used frames and parameter sets
#![allow(dead_code)]

use nfchal::ListenParams;

/// ISO 14443 Type A wake-up survey
pub const REQA: [u8; 1] = [0x26];

/// A Type A answer-to-request (ATQA) with single-size UID, bit-frame
/// anticollision
pub const ATQA: [u8; 2] = [0x04, 0x00];

/// A Felica polling request as it arrives at an activated target: length
/// byte, command code, system code, request code, time slot
pub fn felica_poll_frame() -> Vec<u8> {
    vec![0x06, 0x00, 0xFF, 0xFF, 0x00, 0x00]
}

/// An ATR_REQ-shaped activating frame for peer-to-peer activation, without
/// the start byte.
pub fn atr_req_frame() -> Vec<u8> {
    let mut frame = vec![0xD4, 0x00];
    frame.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]); // nfcid3
    frame.extend_from_slice(&[0x00, 0x00, 0x00, 0x30]); // did, bs, br, pp
    frame
}

pub fn sample_listen_params() -> ListenParams {
    let mut poll_res = [0u8; 18];
    poll_res[0] = 0x01;
    poll_res[1..9].copy_from_slice(&[0x01, 0x2E, 0x3D, 0x4C, 0x5B, 0x6A, 0x79, 0x88]); // idm
    poll_res[9..17].copy_from_slice(&[0x00, 0xF1, 0x00, 0x00, 0x00, 0x01, 0x43, 0x00]); // pmm
    ListenParams::new([0x44, 0x00], [0x04, 0xC5, 0x92], 0x60, poll_res, 0x0A)
        .expect("valid listen params")
}
