//! Minimal end-to-end walk through the HAL against the mock transceiver:
//! apply the Type A profile, raise the field, survey with REQA and print
//! the ATQA.
//!
//! Run with `RUST_LOG=debug` to watch the engine's tracing.

use anyhow::Result;
use nfchal::prelude::*;
use nfchal::transceiver::Events;

fn main() -> Result<()> {
    env_logger::init();

    let shared = SharedMock::new();
    let mut hal = Hal::new(shared.boxed())?;

    hal.apply_protocol_settings(CardType::Iso14443a)?;
    hal.field_on()?;

    // Script the "card": transmit completes, then a 2-byte ATQA arrives.
    shared.with(|m| {
        m.push_events(Events::TX_DONE);
        m.push_rx_frame(&[0x04, 0x00]);
    });

    let resp = hal.exchange(TxOptions::default(), &[0x26])?;
    println!("ATQA: {}", bytes_to_hex_spaced(resp.data));

    Ok(())
}
