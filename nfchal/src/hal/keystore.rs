// nfchal-rs/nfchal/src/hal/keystore.rs

use crate::types::MifareKey;
use crate::{Error, Result};

/// Source of MIFARE Classic key material referenced by number and version,
/// so applications can keep keys out of their own address space (secure
/// element, OS keyring, or a plain table for tests).
pub trait KeyStore {
    /// Look up the key stored under `(key_no, key_version)`.
    fn mifare_key(&self, key_no: u16, key_version: u16) -> Result<MifareKey>;
}

/// Minimal in-memory key store backed by a slot table.
#[derive(Debug, Default)]
pub struct SlotKeyStore {
    slots: Vec<(u16, u16, MifareKey)>,
}

impl SlotKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `key` under `(key_no, key_version)`, replacing an existing
    /// entry for the same slot.
    pub fn insert(&mut self, key_no: u16, key_version: u16, key: MifareKey) {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|(no, ver, _)| *no == key_no && *ver == key_version)
        {
            slot.2 = key;
        } else {
            self.slots.push((key_no, key_version, key));
        }
    }
}

impl KeyStore for SlotKeyStore {
    fn mifare_key(&self, key_no: u16, key_version: u16) -> Result<MifareKey> {
        self.slots
            .iter()
            .find(|(no, ver, _)| *no == key_no && *ver == key_version)
            .map(|(_, _, key)| *key)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "no key stored under number {key_no} version {key_version}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut store = SlotKeyStore::new();
        store.insert(1, 0, MifareKey::from_bytes([0xFF; 6]));
        let k = store.mifare_key(1, 0).unwrap();
        assert_eq!(k.as_bytes(), &[0xFF; 6]);
    }

    #[test]
    fn replace_same_slot() {
        let mut store = SlotKeyStore::new();
        store.insert(2, 1, MifareKey::from_bytes([0xAA; 6]));
        store.insert(2, 1, MifareKey::from_bytes([0xBB; 6]));
        assert_eq!(store.mifare_key(2, 1).unwrap().as_bytes(), &[0xBB; 6]);
    }

    #[test]
    fn missing_slot_is_parameter_error() {
        let store = SlotKeyStore::new();
        assert!(matches!(
            store.mifare_key(9, 9),
            Err(Error::InvalidParameter(_))
        ));
    }
}
