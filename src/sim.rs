//! Simulated accelerator
//!
//! `SimAccelerator` plays the hardware side of the handshake so the driver
//! can run without a board. Bytes exchanged while LOAD is high are shifted
//! into a 32-byte input register (plaintext, then key). The falling edge of
//! LOAD starts the computation, DONE rises after a configurable number of
//! polls, and each exchange after that shifts out one ciphertext byte. A
//! load of fewer than 32 bytes never starts the computation.
//! Every primitive call is recorded in [`SimAccelerator::trace`].

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use bitflags::bitflags;
use embedded_hal::delay::DelayNs;
use log::warn;

use crate::accel::backend::{GpioControl, SpiBackend};
use crate::accel::protocol::transaction::BusOp;
use crate::accel::protocol::{LOAD_BYTES, READ_BYTES};
use crate::block::BLOCK_SIZE;
use crate::error::Error;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PinLevels: u8 {
        const LOAD = 1;      // driven by the host
        const DONE = 1 << 1; // driven by the accelerator
    }
}

/// Level the simulator reports on MISO when it has nothing to shift out
const IDLE_MISO: u8 = 0x00;

pub struct SimAccelerator {
    lines: PinLevels,
    input: [u8; LOAD_BYTES],
    loaded: usize,
    output: [u8; READ_BYTES],
    shifted_out: usize,
    computing: bool,
    done_latency: Option<u32>,
    polls_until_done: u32,
    fail_spi_after: Option<usize>,
    exchanges: usize,
    initialized: bool,
    trace: Vec<BusOp>,
}

impl Default for SimAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimAccelerator {
    /// Accelerator that raises DONE on the first poll
    pub fn new() -> Self {
        Self {
            lines: PinLevels::empty(),
            input: [0; LOAD_BYTES],
            loaded: 0,
            output: [0; READ_BYTES],
            shifted_out: 0,
            computing: false,
            done_latency: Some(0),
            polls_until_done: 0,
            fail_spi_after: None,
            exchanges: 0,
            initialized: false,
            trace: Vec::new(),
        }
    }

    /// Report DONE low for `polls` polls before raising it
    pub fn with_done_latency(mut self, polls: u32) -> Self {
        self.done_latency = Some(polls);
        self
    }

    /// Never raise DONE
    pub fn never_done(mut self) -> Self {
        self.done_latency = None;
        self
    }

    /// Fail every exchange from the `n`th (zero based) onwards
    pub fn fail_spi_after(mut self, n: usize) -> Self {
        self.fail_spi_after = Some(n);
        self
    }

    pub fn trace(&self) -> &[BusOp] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    pub fn lines(&self) -> PinLevels {
        self.lines
    }

    /// Successful byte exchanges so far
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Start a computation on the current input register
    fn start(&mut self) {
        let (plaintext, key) = self.input.split_at(BLOCK_SIZE);

        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut block = GenericArray::clone_from_slice(plaintext);
        cipher.encrypt_block(&mut block);

        self.output.copy_from_slice(&block);
        self.shifted_out = 0;
        self.computing = true;
        self.polls_until_done = self.done_latency.unwrap_or(0);
    }
}

impl SpiBackend for SimAccelerator {
    fn exchange_byte(&mut self, value: u8) -> Result<u8, Error> {
        if self.fail_spi_after.is_some_and(|n| self.exchanges >= n) {
            return Err(Error::Spi);
        }
        self.exchanges += 1;

        let received = if self.lines.contains(PinLevels::LOAD) {
            // Shift register: the last 32 bytes clocked in win
            self.input.copy_within(1.., 0);
            self.input[LOAD_BYTES - 1] = value;
            self.loaded += 1;
            IDLE_MISO
        } else if self.lines.contains(PinLevels::DONE) && self.shifted_out < READ_BYTES {
            let byte = self.output[self.shifted_out];
            self.shifted_out += 1;
            byte
        } else {
            IDLE_MISO
        };

        self.trace.push(BusOp::exchange(value, received));
        Ok(received)
    }

    fn initialize(&mut self) -> Result<(), Error> {
        self.lines = PinLevels::empty();
        self.initialized = true;
        Ok(())
    }
}

impl GpioControl for SimAccelerator {
    fn set_load(&mut self, asserted: bool) -> Result<(), Error> {
        let was_loading = self.lines.contains(PinLevels::LOAD);
        self.trace.push(BusOp::set_load(asserted));

        if asserted {
            self.lines = PinLevels::LOAD;
            self.loaded = 0;
            self.computing = false;
        } else {
            self.lines.remove(PinLevels::LOAD);
            if was_loading && self.loaded >= LOAD_BYTES {
                self.start();
            } else if was_loading {
                // Short load: the core never starts
                warn!("LOAD released after {} of {LOAD_BYTES} bytes", self.loaded);
            }
        }
        Ok(())
    }

    fn done_asserted(&mut self) -> Result<bool, Error> {
        if self.computing && self.done_latency.is_some() {
            if self.polls_until_done == 0 {
                self.lines.insert(PinLevels::DONE);
                self.computing = false;
            } else {
                self.polls_until_done -= 1;
            }
        }

        let done = self.lines.contains(PinLevels::DONE);
        self.trace.push(BusOp::poll_done(done));
        Ok(done)
    }
}

/// Delay provider that does not sleep, only totals what was requested
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
