// nfchal-rs/nfchal/src/hal/builder.rs

use crate::abort::AbortHandle;
use crate::config::shadow::ConfigShadow;
use crate::constants::{DEFAULT_RX_BUFFER_LEN, DEFAULT_TX_BUFFER_LEN};
use crate::exchange::buffer::FrameArena;
use crate::hal::{Hal, KeyStore};
use crate::transceiver::RfTransceiver;
use crate::types::{CardType, TargetMode};
use crate::{Error, Result};

/// Helper to construct a [`Hal`] with optional configuration.
pub struct HalBuilder {
    transceiver: Option<Box<dyn RfTransceiver>>,
    tx_len: usize,
    rx_len: usize,
    aliased: bool,
    key_store: Option<Box<dyn KeyStore>>,
}

impl HalBuilder {
    pub fn new() -> Self {
        Self {
            transceiver: None,
            tx_len: DEFAULT_TX_BUFFER_LEN,
            rx_len: DEFAULT_RX_BUFFER_LEN,
            aliased: false,
            key_store: None,
        }
    }

    /// Provide the transceiver instance (e.g. a chip driver or a
    /// `MockTransceiver`).
    pub fn with_transceiver(mut self, dev: Box<dyn RfTransceiver>) -> Self {
        self.transceiver = Some(dev);
        self
    }

    /// Use separate transmit/receive buffers of the given sizes.
    pub fn buffer_sizes(mut self, tx_len: usize, rx_len: usize) -> Self {
        self.tx_len = tx_len;
        self.rx_len = rx_len;
        self.aliased = false;
        self
    }

    /// Share one memory region of `len` bytes between the transmit and
    /// receive buffers. Receive data is placed behind bytes still owned by
    /// the transmitter; see the frame arena.
    pub fn aliased_buffer(mut self, len: usize) -> Self {
        self.tx_len = len;
        self.rx_len = len;
        self.aliased = true;
        self
    }

    /// Install a MIFARE key store.
    pub fn with_key_store(mut self, store: Box<dyn KeyStore>) -> Self {
        self.key_store = Some(store);
        self
    }

    /// Consume the builder, initialize the device and return the instance.
    pub fn build(self) -> Result<Hal> {
        let dev = self.transceiver.ok_or_else(|| {
            Error::UseCondition("a transceiver is required to build a Hal".to_string())
        })?;
        let arena = if self.aliased {
            FrameArena::new_aliased(self.tx_len)
        } else {
            FrameArena::new(self.tx_len, self.rx_len)
        };
        let mut hal = Hal {
            dev,
            shadow: ConfigShadow::new(),
            arena,
            card_type: CardType::Iso14443a,
            active_mode: false,
            jewel_mode: false,
            target_mode: TargetMode::Off,
            abort: AbortHandle::new(),
            key_store: self.key_store,
        };
        hal.init()?;
        Ok(hal)
    }
}

impl Default for HalBuilder {
    fn default() -> Self {
        Self::new()
    }
}
