// nfchal-rs/nfchal/src/transceiver/mock.rs

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::abort::AbortHandle;
use crate::transceiver::reg::{ChipCommand, REG_COUNT, Reg};
use crate::transceiver::traits::{Events, RfTransceiver};
use crate::{Error, Result};

/// One scripted hardware reaction: the events the next `wait_events` call
/// reports, plus FIFO bytes and register values that become visible with it.
#[derive(Debug, Clone, Default)]
pub struct ScriptStep {
    pub events: Events,
    pub fifo: Vec<u8>,
    pub regs: Vec<(Reg, u8)>,
}

impl ScriptStep {
    /// A step that only reports events.
    pub fn events(events: Events) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Bytes the chip deposits into the FIFO together with the events.
    pub fn with_fifo(mut self, bytes: &[u8]) -> Self {
        self.fifo.extend_from_slice(bytes);
        self
    }

    /// Register value that becomes visible together with the events.
    pub fn with_reg(mut self, reg: Reg, value: u8) -> Self {
        self.regs.push((reg, value));
        self
    }
}

/// Mock transceiver for unit tests. It records register writes, commands and
/// transmitted frames, and plays back queued [`ScriptStep`]s from
/// `wait_events`.
#[derive(Debug, Default)]
pub struct MockTransceiver {
    regs: [u8; REG_COUNT],
    fifo: VecDeque<u8>,
    tx_in_flight: bool,
    script: VecDeque<ScriptStep>,
    /// Record of register writes: (register, value)
    pub writes: Vec<(Reg, u8)>,
    /// Record of command strobes
    pub commands: Vec<ChipCommand>,
    /// Frames shifted out by transmit-class commands
    pub sent_frames: Vec<Vec<u8>>,
    /// Record of the event masks passed to `wait_events`
    pub wait_log: Vec<Events>,
    /// Number of `wait_events` calls
    pub wait_calls: usize,
    /// Block on an empty script until the abort handle is posted, instead of
    /// reporting an immediate timer expiry
    pub block_on_empty: bool,
    /// Testing hook: number of register reads that should fail
    pub read_faults: usize,
    fifo_capacity: usize,
}

impl MockTransceiver {
    pub fn new() -> Self {
        Self {
            fifo_capacity: 256,
            ..Self::default()
        }
    }

    /// Shrink the FIFO to exercise watermark refill paths.
    pub fn with_fifo_capacity(mut self, capacity: usize) -> Self {
        self.fifo_capacity = capacity;
        self
    }

    /// Queue a scripted reaction for the next `wait_events` call.
    pub fn push_step(&mut self, step: ScriptStep) {
        self.script.push_back(step);
    }

    /// Queue a bare event set.
    pub fn push_events(&mut self, events: Events) {
        self.push_step(ScriptStep::events(events));
    }

    /// Queue a completed reception of `frame`.
    pub fn push_rx_frame(&mut self, frame: &[u8]) {
        self.push_step(ScriptStep::events(Events::RX_DONE).with_fifo(frame));
    }

    /// Queue a completed activation: target status register plus the
    /// activating frame.
    pub fn push_activation(&mut self, target_status: u8, frame: &[u8]) {
        self.push_step(
            ScriptStep::events(Events::ACTIVATED)
                .with_fifo(frame)
                .with_reg(Reg::TargetStatus, target_status),
        );
    }

    /// Set how many subsequent register reads should fail (for tests).
    pub fn set_read_faults(&mut self, n: usize) {
        self.read_faults = n;
    }

    /// Current value of a register without going through the trait.
    pub fn reg(&self, reg: Reg) -> u8 {
        self.regs[reg as usize]
    }

    /// Force a register value without recording a write.
    pub fn set_reg(&mut self, reg: Reg, value: u8) {
        self.regs[reg as usize] = value;
    }

    /// Last command strobed, if any.
    pub fn last_command(&self) -> Option<ChipCommand> {
        self.commands.last().copied()
    }

    fn drain_fifo_to_frame(&mut self) -> Vec<u8> {
        self.fifo.drain(..).collect()
    }
}

impl RfTransceiver for MockTransceiver {
    fn read(&mut self, reg: Reg) -> Result<u8> {
        if self.read_faults > 0 {
            self.read_faults -= 1;
            return Err(Error::ReadWrite);
        }
        Ok(self.regs[reg as usize])
    }

    fn write(&mut self, reg: Reg, value: u8) -> Result<()> {
        self.regs[reg as usize] = value;
        self.writes.push((reg, value));
        Ok(())
    }

    fn write_fifo(&mut self, data: &[u8]) -> Result<usize> {
        if self.tx_in_flight {
            // Bytes streamed while the shifter runs go straight out.
            match self.sent_frames.last_mut() {
                Some(frame) => frame.extend_from_slice(data),
                None => self.sent_frames.push(data.to_vec()),
            }
            return Ok(data.len());
        }
        let room = self.fifo_capacity.saturating_sub(self.fifo.len());
        let n = room.min(data.len());
        self.fifo.extend(&data[..n]);
        Ok(n)
    }

    fn read_fifo(&mut self, out: &mut [u8]) -> Result<usize> {
        let n = out.len().min(self.fifo.len());
        for slot in out.iter_mut().take(n) {
            *slot = self.fifo.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn fifo_level(&mut self) -> Result<usize> {
        Ok(self.fifo.len())
    }

    fn flush_fifo(&mut self) -> Result<()> {
        self.fifo.clear();
        Ok(())
    }

    fn fifo_capacity(&self) -> usize {
        self.fifo_capacity
    }

    fn command(&mut self, cmd: ChipCommand) -> Result<()> {
        self.commands.push(cmd);
        match cmd {
            ChipCommand::Transmit | ChipCommand::Transceive => {
                let frame = self.drain_fifo_to_frame();
                self.sent_frames.push(frame);
                self.tx_in_flight = true;
            }
            ChipCommand::Configure | ChipCommand::MifareAuthent => {
                let frame = self.drain_fifo_to_frame();
                self.sent_frames.push(frame);
            }
            ChipCommand::Idle => {
                self.tx_in_flight = false;
            }
            ChipCommand::SoftReset => {
                self.regs = [0; REG_COUNT];
                self.fifo.clear();
                self.tx_in_flight = false;
            }
            ChipCommand::Receive | ChipCommand::Autocoll => {}
        }
        Ok(())
    }

    fn wait_events(&mut self, wanted: Events, abort: &AbortHandle) -> Result<Events> {
        self.wait_calls += 1;
        self.wait_log.push(wanted);
        if abort.consume() {
            return Err(Error::Aborted);
        }
        if let Some(step) = self.script.pop_front() {
            for (reg, value) in &step.regs {
                self.regs[*reg as usize] = *value;
            }
            self.fifo.extend(&step.fifo);
            if step.events.contains(Events::TX_DONE) {
                self.tx_in_flight = false;
            }
            return Ok(step.events);
        }
        if self.block_on_empty {
            // Block like an interrupt-driven wait with no event pending; only
            // a posted abort (or, eventually, the bounded window running out)
            // unblocks.
            for _ in 0..40 {
                if abort.wait_for(crate::utils::default_event_timeout()) {
                    return Err(Error::Aborted);
                }
            }
        }
        // No scripted reaction: behave like an armed timer expiring.
        Ok(Events::TIMER)
    }

    fn consume_events(&mut self, _mask: Events) -> Result<()> {
        Ok(())
    }
}

/// Shared handle to a [`MockTransceiver`] so a test can keep inspecting the
/// mock after the HAL instance took ownership of the trait object.
#[derive(Clone, Debug)]
pub struct SharedMock {
    inner: Rc<RefCell<MockTransceiver>>,
}

impl SharedMock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MockTransceiver::new())),
        }
    }

    pub fn from_mock(mock: MockTransceiver) -> Self {
        Self {
            inner: Rc::new(RefCell::new(mock)),
        }
    }

    /// Run `f` against the underlying mock.
    pub fn with<R>(&self, f: impl FnOnce(&mut MockTransceiver) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Box a delegating handle for `Hal` construction.
    pub fn boxed(&self) -> Box<dyn RfTransceiver> {
        Box::new(self.clone())
    }
}

impl RfTransceiver for SharedMock {
    fn read(&mut self, reg: Reg) -> Result<u8> {
        self.inner.borrow_mut().read(reg)
    }

    fn write(&mut self, reg: Reg, value: u8) -> Result<()> {
        self.inner.borrow_mut().write(reg, value)
    }

    fn write_fifo(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.borrow_mut().write_fifo(data)
    }

    fn read_fifo(&mut self, out: &mut [u8]) -> Result<usize> {
        self.inner.borrow_mut().read_fifo(out)
    }

    fn fifo_level(&mut self) -> Result<usize> {
        self.inner.borrow_mut().fifo_level()
    }

    fn flush_fifo(&mut self) -> Result<()> {
        self.inner.borrow_mut().flush_fifo()
    }

    fn fifo_capacity(&self) -> usize {
        self.inner.borrow().fifo_capacity()
    }

    fn command(&mut self, cmd: ChipCommand) -> Result<()> {
        self.inner.borrow_mut().command(cmd)
    }

    fn wait_events(&mut self, wanted: Events, abort: &AbortHandle) -> Result<Events> {
        self.inner.borrow_mut().wait_events(wanted, abort)
    }

    fn consume_events(&mut self, mask: Events) -> Result<()> {
        self.inner.borrow_mut().consume_events(mask)
    }
}
