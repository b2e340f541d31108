#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::constants::CARRIER_CLOCK_KHZ;
use nfchal::transceiver::Reg;
use nfchal::{ConfigKey, SharedMock, TimerSetting};
use proptest::prelude::*;

fn armed_setting(shared: &SharedMock) -> TimerSetting {
    shared.with(|m| TimerSetting {
        prescaler: (u16::from(m.reg(Reg::TPrescalerHi)) << 8) | u16::from(m.reg(Reg::TPrescalerLo)),
        reload: (u16::from(m.reg(Reg::TReloadHi)) << 8) | u16::from(m.reg(Reg::TReloadLo)),
    })
}

proptest! {
    // Committing a timeout through the configuration interface must arm the
    // hardware with a duration at least as long as requested, at any data
    // rate.
    #[test]
    fn committed_timeout_is_never_shorter(value in 16u16..60_000, rate in 0u16..=3) {
        let (mut hal, shared) = helpers::shared_mock_hal();
        hal.set_config(ConfigKey::RxDataRate, rate).unwrap();
        hal.set_config(ConfigKey::TimeoutUs, value).unwrap();
        let armed = armed_setting(&shared);
        prop_assert!(armed.reconstructed_us(CARRIER_CLOCK_KHZ) >= u64::from(value));
    }
}

#[test]
fn millisecond_timeouts_commit_longer_settings() {
    let (mut hal, shared) = helpers::shared_mock_hal();
    hal.set_config(ConfigKey::TimeoutMs, 10).unwrap();
    let armed = armed_setting(&shared);
    assert!(armed.reconstructed_us(CARRIER_CLOCK_KHZ) >= 10_000);
}
