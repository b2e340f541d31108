// nfchal-rs/nfchal/src/hal/mod.rs

//! The HAL instance: exclusive owner of the transceiver, the frame arena and
//! the configuration shadow.
//!
//! One [`Hal`] exists per physical device. All calls must be serialized by
//! the caller; the only suspension points are the blocking waits inside
//! `transmit`/`receive`/`exchange`/`wait` and the autocoll engine, each of
//! which consumes a posted [`AbortHandle`](crate::abort::AbortHandle).

pub mod builder;
pub mod field;
pub mod keystore;
pub mod listen;
pub mod mifare;

use log::debug;

use crate::abort::AbortHandle;
use crate::config::shadow::ConfigShadow;
use crate::exchange::buffer::FrameArena;
use crate::transceiver::{ChipCommand, RfTransceiver};
use crate::types::{CardType, TargetMode};
use crate::{ConfigKey, Result};

pub use builder::HalBuilder;
pub use keystore::{KeyStore, SlotKeyStore};

/// HAL instance for one contactless front-end device.
pub struct Hal {
    pub(crate) dev: Box<dyn RfTransceiver>,
    pub(crate) shadow: ConfigShadow,
    pub(crate) arena: FrameArena,
    pub(crate) card_type: CardType,
    pub(crate) active_mode: bool,
    pub(crate) jewel_mode: bool,
    pub(crate) target_mode: TargetMode,
    pub(crate) abort: AbortHandle,
    pub(crate) key_store: Option<Box<dyn KeyStore>>,
}

impl Hal {
    /// Initialize a HAL instance over `dev` with default buffer sizes.
    pub fn new(dev: Box<dyn RfTransceiver>) -> Result<Self> {
        HalBuilder::new().with_transceiver(dev).build()
    }

    /// Bring the chip to its power-up state and commit the default
    /// configuration so the shadow mirrors hardware from the start.
    pub(crate) fn init(&mut self) -> Result<()> {
        debug!("hal init");
        self.dev.command(ChipCommand::SoftReset)?;
        self.dev.flush_fifo()?;
        for &(key, value) in crate::config::shadow::DEFAULT_SETTINGS {
            self.set_config(key, value)?;
        }
        Ok(())
    }

    /// Release the device: idle the command unit, drop buffers and flags,
    /// and hand the transceiver back to the caller.
    pub fn deinit(mut self) -> Result<Box<dyn RfTransceiver>> {
        debug!("hal deinit");
        self.field_off()?;
        self.dev.command(ChipCommand::Idle)?;
        self.dev.flush_fifo()?;
        Ok(self.dev)
    }

    /// Clone of the cancellation token. Another thread may `post` it to
    /// unblock the current or next blocking call with `Error::Aborted`.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// The technology profile currently applied.
    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    /// Target-mode value; `On` once an autocoll activation succeeded.
    pub fn target_mode(&self) -> TargetMode {
        self.target_mode
    }

    /// Whether active-communication mode is enabled.
    pub fn is_active_mode(&self) -> bool {
        self.active_mode
    }

    /// Install a key store used by `authenticate_mifare_stored`.
    pub fn set_key_store(&mut self, store: Box<dyn KeyStore>) {
        self.key_store = Some(store);
    }

    /// Valid bits of the last received byte, as also exposed through
    /// [`ConfigKey::RxLastBits`].
    pub fn rx_last_bits(&self) -> u8 {
        self.shadow.fetch(ConfigKey::RxLastBits).unwrap_or(0) as u8
    }
}
