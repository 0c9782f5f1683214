//! High-level accelerator driver
//!
//! This module runs the load / wait / read handshake against any backend
//! implementing the transport traits.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use super::backend::{Clock, GpioControl, NoClock, SpiBackend};
use super::protocol::phase::Phase;
use super::protocol::DEFAULT_DUMMY_BYTE;
use crate::block::{Ciphertext, Key, Plaintext};
use crate::error::Error;

/// Tunables for one driver instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Longest total wait for DONE before giving up
    pub done_timeout: Duration,
    /// Sleep between DONE polls (initial value when backing off)
    pub poll_interval: Duration,
    /// Upper bound for the poll interval when backing off
    pub max_poll_interval: Duration,
    /// Double the poll interval after each unsuccessful poll
    pub backoff: bool,
    /// Filler clocked out during the read phase
    pub dummy_byte: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            done_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_micros(10),
            max_poll_interval: Duration::from_millis(1),
            backoff: false,
            dummy_byte: DEFAULT_DUMMY_BYTE,
        }
    }
}

impl DriverConfig {
    pub fn with_done_timeout(mut self, timeout: Duration) -> Self {
        self.done_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enable exponential back-off, capping the interval at `max_interval`
    pub fn with_backoff(mut self, max_interval: Duration) -> Self {
        self.backoff = true;
        self.max_poll_interval = max_interval;
        self
    }

    pub fn with_dummy_byte(mut self, dummy: u8) -> Self {
        self.dummy_byte = dummy;
        self
    }
}

/// Saturating conversion to whole nanoseconds
fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Accelerator driver - works with any backend
///
/// Without a clock (`NoClock`) the DONE timeout counts only the requested
/// delays; attach one with [`AccelDriver::with_clock`] to bound it in real time.
pub struct AccelDriver<B, D, C = NoClock> {
    backend: B,
    delay: D,
    clock: C,
    config: DriverConfig,
    phase: Phase,
    initialized: bool,
}

impl<B, D> AccelDriver<B, D>
where
    B: SpiBackend + GpioControl,
    D: DelayNs,
{
    /// Create a new driver with the default configuration
    pub fn new(backend: B, delay: D) -> Self {
        Self::with_config(backend, delay, DriverConfig::default())
    }

    pub fn with_config(backend: B, delay: D, config: DriverConfig) -> Self {
        Self {
            backend,
            delay,
            clock: NoClock,
            config,
            phase: Phase::Idle,
            initialized: false,
        }
    }
}

impl<B, D, C> AccelDriver<B, D, C>
where
    B: SpiBackend + GpioControl,
    D: DelayNs,
    C: Clock,
{
    /// Measure the DONE wait with `clock`
    pub fn with_clock<K: Clock>(self, clock: K) -> AccelDriver<B, D, K> {
        AccelDriver {
            backend: self.backend,
            delay: self.delay,
            clock,
            config: self.config,
            phase: self.phase,
            initialized: self.initialized,
        }
    }

    /// Initialize the transport
    ///
    /// Runs once; `encrypt` calls it implicitly.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }

        self.backend.initialize()?;

        self.initialized = true;
        Ok(())
    }

    /// Check if initialization is complete
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Phase the last session ended in
    ///
    /// `Complete` after a successful session, `Idle` before the first one
    /// and after a failed one.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Give back the backend and delay provider
    pub fn release(self) -> (B, D) {
        (self.backend, self.delay)
    }

    /// Encrypt one block on the accelerator
    pub fn encrypt(&mut self, key: &Key, plaintext: &Plaintext) -> Result<Ciphertext, Error> {
        let mut ciphertext = Ciphertext::default();
        self.encrypt_into(key, plaintext, &mut ciphertext)?;
        Ok(ciphertext)
    }

    /// Encrypt one block into `ciphertext`
    ///
    /// `ciphertext` is only written once the whole block has been read
    /// back; on error it keeps its previous contents.
    pub fn encrypt_into(
        &mut self,
        key: &Key,
        plaintext: &Plaintext,
        ciphertext: &mut Ciphertext,
    ) -> Result<(), Error> {
        self.init()?;

        match self.run_session(key, plaintext) {
            Ok(block) => {
                *ciphertext = block;
                Ok(())
            }
            Err(err) => {
                self.abort(&err);
                Err(err)
            }
        }
    }

    /// One full handshake:
    /// 1. Assert LOAD
    /// 2. Clock out plaintext, then key
    /// 3. Release LOAD to start the computation
    /// 4. Poll DONE
    /// 5. Clock in the ciphertext
    fn run_session(&mut self, key: &Key, plaintext: &Plaintext) -> Result<Ciphertext, Error> {
        self.phase = Phase::Idle;

        self.phase.advance(Phase::Loading)?;
        self.backend.set_load(true)?;
        debug!("LOAD asserted, sending plaintext and key");
        debug_assert!(self.phase.load_asserted() && self.phase.transfers_bytes());
        self.backend.write_block(plaintext.as_bytes())?;
        self.backend.write_block(key.as_bytes())?;

        self.backend.set_load(false)?;
        self.phase.advance(Phase::WaitingDone)?;
        debug!("LOAD released, waiting for DONE");
        let polls = self.wait_done()?;

        self.phase.advance(Phase::Reading)?;
        debug!("DONE after {polls} polls, reading ciphertext");
        debug_assert!(self.phase.transfers_bytes());
        let block = self.backend.read_block(self.config.dummy_byte)?;

        self.phase.advance(Phase::Complete)?;
        Ok(Ciphertext::new(block))
    }

    /// Poll DONE until it is asserted or the timeout budget is spent
    ///
    /// Elapsed time is the larger of the clock reading and the sum of the
    /// requested delays. Returns the number of polls it took.
    fn wait_done(&mut self) -> Result<u32, Error> {
        let timeout_ns = as_nanos(self.config.done_timeout);
        let max_interval_ns = as_nanos(self.config.max_poll_interval).max(1);
        let mut interval_ns = as_nanos(self.config.poll_interval).max(1);
        let start = self.clock.now();
        let mut slept_ns = 0u64;
        let mut polls = 0u32;

        loop {
            polls = polls.saturating_add(1);
            if self.backend.done_asserted()? {
                return Ok(polls);
            }

            let measured_ns = as_nanos(self.clock.now().saturating_sub(start));
            let waited_ns = slept_ns.max(measured_ns);
            if waited_ns >= timeout_ns {
                warn!("DONE not asserted after {polls} polls ({waited_ns} ns)");
                return Err(Error::Timeout { polls, waited_ns });
            }

            let step = interval_ns
                .min(timeout_ns - waited_ns)
                .min(u64::from(u32::MAX));
            self.delay.delay_ns(step as u32);
            slept_ns = slept_ns.saturating_add(step);

            if self.config.backoff {
                interval_ns = interval_ns.saturating_mul(2).min(max_interval_ns);
            }
        }
    }

    /// Leave the bus in a known state after a failed session
    fn abort(&mut self, err: &Error) {
        warn!("Session failed in {:?}: {err}", self.phase);

        if self.phase.load_asserted() {
            // LOAD may still be high
            if self.backend.set_load(false).is_err() {
                warn!("Could not release LOAD");
            }
        }

        self.phase = Phase::Idle;
    }
}
