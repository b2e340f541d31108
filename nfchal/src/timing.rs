// nfchal-rs/nfchal/src/timing.rs

//! Timing engine: converts wall-clock durations into hardware timer settings
//! and back.
//!
//! All conversions round up, so a requested timeout is never shortened by
//! quantization. The receive path additionally compensates the demodulator
//! pipeline latency (scaled inversely with the data rate) and, for Felica or
//! fast active communication, a fixed digital processing delay.

use log::trace;

use crate::constants::{
    FELICA_DIGITAL_DELAY_US, TIMER_PRESCALER_MAX, TIMER_RELOAD_MAX, TIMER_SHIFT_BITS,
    WAIT_SINGLE_SHOT_MAX_MS,
};
use crate::hal::Hal;
use crate::transceiver::{Events, Reg};
use crate::types::{CardType, ConfigKey, DataRate, TimeUnit, TimerSetting, TimerSnapshot};
use crate::{Error, Result};

/// Pipeline latency compensation for the given receive data rate, in us.
pub fn timer_shift_us(rate: DataRate) -> u32 {
    (TIMER_SHIFT_BITS * 1000).div_ceil(rate.kbps())
}

/// Compute the smallest timer setting representing at least `us`
/// microseconds on a `clock_khz` reference clock.
///
/// The smallest prescaler keeping the reload within 16 bits is chosen;
/// both the tick count and the reload are rounded up.
pub fn compute_timer_setting_us(us: u64, clock_khz: u32) -> Result<TimerSetting> {
    let ticks = (us * u64::from(clock_khz)).div_ceil(1000);
    let denom_needed = ticks.div_ceil(u64::from(TIMER_RELOAD_MAX)).max(1);
    if denom_needed > 1 + 2 * u64::from(TIMER_PRESCALER_MAX) {
        return Err(Error::ParameterOverflow);
    }
    let prescaler = (denom_needed - 1).div_ceil(2);
    let denom = 1 + 2 * prescaler;
    let reload = ticks.div_ceil(denom).max(1);
    Ok(TimerSetting {
        prescaler: prescaler as u16,
        reload: reload as u16,
    })
}

/// Longest duration representable by the timer unit, in microseconds.
pub fn max_timeout_us(clock_khz: u32) -> u64 {
    let max_ticks = u64::from(TIMER_RELOAD_MAX) * (1 + 2 * u64::from(TIMER_PRESCALER_MAX));
    max_ticks * 1000 / u64::from(clock_khz)
}

fn to_us(unit: TimeUnit, value: u32) -> u64 {
    match unit {
        TimeUnit::Microseconds => u64::from(value),
        TimeUnit::Milliseconds => u64::from(value) * 1000,
    }
}

impl Hal {
    /// Receive data rate currently configured in the shadow.
    pub(crate) fn rx_data_rate(&self) -> DataRate {
        self.shadow
            .fetch(ConfigKey::RxDataRate)
            .and_then(|v| DataRate::try_from(v).ok())
            .unwrap_or(DataRate::R106)
    }

    /// Transmit data rate currently configured in the shadow.
    pub(crate) fn tx_data_rate(&self) -> DataRate {
        self.shadow
            .fetch(ConfigKey::TxDataRate)
            .and_then(|v| DataRate::try_from(v).ok())
            .unwrap_or(DataRate::R106)
    }

    /// Whether the fixed digital processing delay applies: Felica, or
    /// active-mode communication above 106 kbit/s.
    pub(crate) fn digital_delay_applies(&self) -> bool {
        matches!(self.card_type, CardType::Felica212 | CardType::Felica424)
            || (self.active_mode && self.rx_data_rate().kbps() > 106)
    }

    /// Convert a requested receive timeout into a timer setting, including
    /// the pipeline and digital-delay compensation.
    pub(crate) fn timeout_setting(&self, unit: TimeUnit, value: u32) -> Result<TimerSetting> {
        let mut us = to_us(unit, value) + u64::from(timer_shift_us(self.rx_data_rate()));
        if self.digital_delay_applies() {
            us += u64::from(FELICA_DIGITAL_DELAY_US);
        }
        compute_timer_setting_us(us, self.dev.clock_khz())
    }

    /// Commit a timer setting to the prescaler/reload registers.
    pub(crate) fn arm_timer(&mut self, setting: TimerSetting) -> Result<()> {
        trace!(
            "arm timer: prescaler={} reload={}",
            setting.prescaler, setting.reload
        );
        self.dev
            .write_u16(Reg::TPrescalerHi, Reg::TPrescalerLo, setting.prescaler)?;
        self.dev
            .write_u16(Reg::TReloadHi, Reg::TReloadLo, setting.reload)
    }

    /// Read back the armed setting and the remaining counts.
    pub(crate) fn timer_snapshot(&mut self) -> Result<TimerSnapshot> {
        let prescaler = self.dev.read_u16(Reg::TPrescalerHi, Reg::TPrescalerLo)?;
        let reload = self.dev.read_u16(Reg::TReloadHi, Reg::TReloadLo)?;
        let remaining = self.dev.read_u16(Reg::TCounterHi, Reg::TCounterLo)?;
        Ok(TimerSnapshot {
            setting: TimerSetting { prescaler, reload },
            remaining,
        })
    }

    /// Time elapsed between the end of transmission and the end of the last
    /// reception, in microseconds.
    ///
    /// Performs the inverse of the timeout computation: the pipeline shift
    /// is subtracted, and when the exchange ended in a timeout the digital
    /// delay is subtracted as well so the result never exceeds the
    /// requested timeout.
    pub fn measure_elapsed_us(&mut self, timed_out: bool) -> Result<u64> {
        let snap = self.timer_snapshot()?;
        let elapsed_ticks = u64::from(snap.setting.reload.saturating_sub(snap.remaining));
        let mut us =
            elapsed_ticks * snap.setting.denominator() * 1000 / u64::from(self.dev.clock_khz());
        us = us.saturating_sub(u64::from(timer_shift_us(self.rx_data_rate())));
        if timed_out && self.digital_delay_applies() {
            us = us.saturating_sub(u64::from(FELICA_DIGITAL_DELAY_US));
        }
        Ok(us)
    }

    /// Block for the given duration. Millisecond durations beyond the
    /// single-shot ceiling are chained from back-to-back hardware waits.
    pub fn wait(&mut self, unit: TimeUnit, value: u32) -> Result<()> {
        match unit {
            TimeUnit::Microseconds => self.wait_single(u64::from(value)),
            TimeUnit::Milliseconds => {
                let mut remaining = value;
                while remaining > 0 {
                    let chunk = remaining.min(WAIT_SINGLE_SHOT_MAX_MS);
                    self.wait_single(u64::from(chunk) * 1000)?;
                    remaining -= chunk;
                }
                Ok(())
            }
        }
    }

    fn wait_single(&mut self, us: u64) -> Result<()> {
        let setting = compute_timer_setting_us(us, self.dev.clock_khz())?;
        self.arm_timer(setting)?;
        loop {
            let ev = self.dev.wait_events(Events::TIMER, &self.abort)?;
            if ev.contains(Events::TIMER) {
                return Ok(());
            }
        }
    }
}
