#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::transceiver::ChipCommand;
use nfchal::{ListenTech, TargetFraming, TargetMode};

// Interoperability quirk, pinned exactly: a request for only passive
// Type B succeeds immediately. No blocking wait, no activation command, no
// target mode.
#[test]
fn passive_type_b_only_returns_success_immediately() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    let waits_before = shared.with(|m| m.wait_calls);

    let activation = hal.autocoll(ListenTech::PASSIVE_B).unwrap();

    assert_eq!(activation.framing, TargetFraming::Passive106);
    assert!(activation.frame.is_empty());
    assert_eq!(shared.with(|m| m.wait_calls), waits_before);
    assert!(!shared.with(|m| m.commands.contains(&ChipCommand::Autocoll)));
    assert_eq!(hal.target_mode(), TargetMode::Off);
}

// The quirk does not extend to combined requests: with another technology
// present, Type B is simply ignored and the engine listens normally.
#[test]
fn type_b_combined_with_type_a_still_listens() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    // no external field: the engine must fail instead of quietly
    // succeeding like the B-only path
    let got = hal.autocoll(ListenTech::PASSIVE_B | ListenTech::PASSIVE_A);
    assert!(got.is_err());
    assert!(shared.with(|m| m.commands.contains(&ChipCommand::Idle)));
}
