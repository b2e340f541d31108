// nfchal-rs/nfchal/src/exchange/buffer.rs

//! Frame arena: the transmit and receive buffers owned by the HAL instance.
//!
//! The two regions may alias one memory block to save RAM. In that
//! configuration the receive region starts behind the bytes still owned by
//! the transmitter (pending transmission, or retained for a retransmission),
//! so incoming data can never overwrite them.

use crate::{Error, Result};

/// Transmit/receive buffer pair with explicit offset bookkeeping.
#[derive(Debug)]
pub struct FrameArena {
    mem: Vec<u8>,
    aliased: bool,
    /// Receive region start when not aliased
    rx_off: usize,
    /// Receive region capacity when not aliased
    rx_cap: usize,
    tx_len: usize,
    /// Length of the most recently transmitted frame, kept for retransmission
    tx_last: usize,
    rx_len: usize,
}

impl FrameArena {
    /// Separate transmit and receive buffers.
    pub fn new(tx_cap: usize, rx_cap: usize) -> Self {
        Self {
            mem: vec![0; tx_cap + rx_cap],
            aliased: false,
            rx_off: tx_cap,
            rx_cap,
            tx_len: 0,
            tx_last: 0,
            rx_len: 0,
        }
    }

    /// One shared region of `len` bytes for both directions.
    pub fn new_aliased(len: usize) -> Self {
        Self {
            mem: vec![0; len],
            aliased: true,
            rx_off: 0,
            rx_cap: len,
            tx_len: 0,
            tx_last: 0,
            rx_len: 0,
        }
    }

    pub fn is_aliased(&self) -> bool {
        self.aliased
    }

    /// Capacity available to the transmit region.
    pub fn tx_capacity(&self) -> usize {
        if self.aliased { self.mem.len() } else { self.rx_off }
    }

    /// Bytes still owned by the transmitter: pending, or retained for a
    /// retransmission.
    fn tx_reserved(&self) -> usize {
        self.tx_len.max(self.tx_last)
    }

    /// Start offset of the receive region.
    pub fn rx_start(&self) -> usize {
        if self.aliased {
            self.tx_reserved()
        } else {
            self.rx_off
        }
    }

    /// Capacity left to the receive region.
    pub fn rx_capacity(&self) -> usize {
        if self.aliased {
            self.mem.len() - self.tx_reserved()
        } else {
            self.rx_cap
        }
    }

    /// Append a chunk to the transmit buffer. On overflow the buffer is
    /// reset to empty and `BufferOverflow` is returned.
    pub fn append_tx(&mut self, data: &[u8]) -> Result<()> {
        if self.tx_len + data.len() > self.tx_capacity() {
            self.tx_len = 0;
            return Err(Error::BufferOverflow);
        }
        // Fresh transmit data invalidates the previous frame and, in the
        // aliased layout, any received bytes sitting behind it.
        self.tx_last = 0;
        if self.aliased {
            self.rx_len = 0;
        }
        self.mem[self.tx_len..self.tx_len + data.len()].copy_from_slice(data);
        self.tx_len += data.len();
        Ok(())
    }

    /// Buffered bytes awaiting transmission.
    pub fn tx_pending(&self) -> &[u8] {
        &self.mem[..self.tx_len]
    }

    pub fn tx_len(&self) -> usize {
        self.tx_len
    }

    /// Transmission completed: the pending bytes become the retained
    /// previous frame.
    pub fn mark_sent(&mut self) {
        self.tx_last = self.tx_len;
        self.tx_len = 0;
    }

    /// Drop pending transmit bytes (error path).
    pub fn reset_tx(&mut self) {
        self.tx_len = 0;
    }

    /// The most recently transmitted frame, for retransmission.
    pub fn last_frame(&self) -> &[u8] {
        &self.mem[..self.tx_last]
    }

    /// Append received bytes behind the transmitter-owned region.
    pub fn rx_write(&mut self, data: &[u8]) -> Result<()> {
        if self.rx_len + data.len() > self.rx_capacity() {
            return Err(Error::BufferOverflow);
        }
        let start = self.rx_start() + self.rx_len;
        self.mem[start..start + data.len()].copy_from_slice(data);
        self.rx_len += data.len();
        Ok(())
    }

    pub fn rx_len(&self) -> usize {
        self.rx_len
    }

    pub fn reset_rx(&mut self) {
        self.rx_len = 0;
    }

    /// The received frame.
    pub fn rx_frame(&self) -> &[u8] {
        let start = self.rx_start();
        &self.mem[start..start + self.rx_len]
    }

    /// The received frame with `offset` leading bytes stripped.
    pub fn rx_frame_from(&self, offset: usize) -> &[u8] {
        let frame = self.rx_frame();
        &frame[offset.min(frame.len())..]
    }
}
