#[path = "../common/mod.rs"]
mod common;

use common::helpers;
use nfchal::CardType;
use nfchal::config::profile_for;

const TYPES: [CardType; 7] = [
    CardType::Iso14443a,
    CardType::Iso14443b,
    CardType::Felica212,
    CardType::Felica424,
    CardType::Iso15693,
    CardType::Iso18000p3m3,
    CardType::Iso18092,
];

// Applying a profile and then re-applying `Current` must leave every
// profile-default key unchanged.
#[test]
fn reapply_current_is_idempotent_for_every_profile() {
    for card_type in TYPES {
        let (mut hal, _shared) = helpers::shared_mock_hal();
        hal.apply_protocol_settings(card_type).unwrap();
        let profile = profile_for(card_type).unwrap();

        let before: Vec<u16> = profile
            .defaults
            .iter()
            .map(|&(key, _)| hal.get_config(key).unwrap())
            .collect();

        hal.apply_protocol_settings(CardType::Current).unwrap();

        let after: Vec<u16> = profile
            .defaults
            .iter()
            .map(|&(key, _)| hal.get_config(key).unwrap())
            .collect();

        assert_eq!(before, after, "profile keys drifted for {card_type}");
        assert_eq!(hal.card_type(), card_type);
    }
}

#[test]
fn profiles_load_their_own_defaults() {
    for card_type in TYPES {
        let (mut hal, _shared) = helpers::shared_mock_hal();
        hal.apply_protocol_settings(card_type).unwrap();
        for &(key, value) in profile_for(card_type).unwrap().defaults {
            assert_eq!(
                hal.get_config(key).unwrap(),
                value,
                "{key:?} mismatch for {card_type}"
            );
        }
    }
}
