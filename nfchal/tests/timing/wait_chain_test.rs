#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::constants::CARRIER_CLOCK_KHZ;
use nfchal::transceiver::Reg;
use nfchal::{TimeUnit, TimerSetting};

// Reassemble the settings armed by each chained wait from the register
// write log: every single-shot writes prescaler high/low then reload
// high/low.
fn armed_settings(writes: &[(Reg, u8)]) -> Vec<TimerSetting> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 3 < writes.len() {
        if writes[i].0 == Reg::TPrescalerHi
            && writes[i + 1].0 == Reg::TPrescalerLo
            && writes[i + 2].0 == Reg::TReloadHi
            && writes[i + 3].0 == Reg::TReloadLo
        {
            out.push(TimerSetting {
                prescaler: (u16::from(writes[i].1) << 8) | u16::from(writes[i + 1].1),
                reload: (u16::from(writes[i + 2].1) << 8) | u16::from(writes[i + 3].1),
            });
            i += 4;
        } else {
            i += 1;
        }
    }
    out
}

#[test]
fn five_second_wait_chains_five_single_shots() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    shared.with(|m| {
        m.writes.clear();
        m.wait_calls = 0;
    });

    hal.wait(TimeUnit::Milliseconds, 5000).unwrap();

    assert_eq!(shared.with(|m| m.wait_calls), 5);
    let settings = armed_settings(&shared.with(|m| m.writes.clone()));
    assert_eq!(settings.len(), 5);
    let total_us: u64 = settings
        .iter()
        .map(|s| s.reconstructed_us(CARRIER_CLOCK_KHZ))
        .sum();
    // The chained shots cover the requested 5000 ms, with only rounding on
    // top of it.
    assert!(total_us >= 5_000_000, "total {total_us}");
    assert!(total_us < 5_001_000, "total {total_us}");
}

#[test]
fn remainder_chunk_is_not_dropped() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    shared.with(|m| {
        m.writes.clear();
        m.wait_calls = 0;
    });

    hal.wait(TimeUnit::Milliseconds, 2500).unwrap();

    assert_eq!(shared.with(|m| m.wait_calls), 3);
    let settings = armed_settings(&shared.with(|m| m.writes.clone()));
    let total_us: u64 = settings
        .iter()
        .map(|s| s.reconstructed_us(CARRIER_CLOCK_KHZ))
        .sum();
    assert!(total_us >= 2_500_000);
}
