#[path = "../common/mod.rs"]
mod common;

use std::collections::HashMap;

use common::helpers;
use nfchal::ConfigKey;
use proptest::prelude::*;

// The plain stored keys: no register side effects, so any sequence of sets
// must read back the last value written.
const PLAIN_KEYS: [ConfigKey; 4] = [
    ConfigKey::FieldOffTimeMs,
    ConfigKey::FieldRecoveryTimeMs,
    ConfigKey::RfResetAfterTimeout,
    ConfigKey::MifareHalted,
];

fn clamp_for(key: ConfigKey, raw: u16) -> u16 {
    match key {
        ConfigKey::RfResetAfterTimeout | ConfigKey::MifareHalted => raw % 2,
        // field times must be at least 1 ms
        _ => raw.max(1),
    }
}

proptest! {
    #[test]
    fn last_set_value_wins(ops in prop::collection::vec((0usize..PLAIN_KEYS.len(), any::<u16>()), 1..32)) {
        let (mut hal, _shared) = helpers::shared_mock_hal();
        let mut mirror: HashMap<ConfigKey, u16> = HashMap::new();
        for (idx, raw) in ops {
            let key = PLAIN_KEYS[idx];
            let value = clamp_for(key, raw);
            hal.set_config(key, value).unwrap();
            mirror.insert(key, value);
        }
        for (key, expected) in mirror {
            prop_assert_eq!(hal.get_config(key).unwrap(), expected);
        }
    }
}

#[test]
fn defaults_are_readable_after_init() {
    let (hal, _shared) = helpers::shared_mock_hal();
    for key in PLAIN_KEYS {
        hal.get_config(key).unwrap();
    }
    assert_eq!(hal.get_config(ConfigKey::RxLastBits).unwrap(), 0);
}
