//! Backend abstraction module - hardware-specific implementations
//!
//! This module defines the transport traits the accelerator driver runs on
//! and provides an embedded-hal 1.0 implementation. The simulated
//! accelerator in `crate::sim` implements the same traits.

use core::time::Duration;

use log::trace;

use crate::block::BLOCK_SIZE;
use crate::error::Error;

pub mod eh1;

/// Byte-oriented full-duplex serial transport
///
/// This trait abstracts the low-level SPI operations the handshake needs.
/// It allows the same protocol logic to run against real hardware or a
/// simulated accelerator.
pub trait SpiBackend {
    /// Clock one byte out while clocking one byte in
    ///
    /// # Arguments
    /// * `value` - Byte to send
    ///
    /// # Returns
    /// Byte received during the same clock cycles
    fn exchange_byte(&mut self, value: u8) -> Result<u8, Error>;

    /// Configure the bus and control pin directions
    fn initialize(&mut self) -> Result<(), Error>;

    /// Clock out a whole block, discarding what comes back
    fn write_block(&mut self, block: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
        for (i, byte) in block.iter().enumerate() {
            let discarded = self.exchange_byte(*byte)?;
            trace!("tx[{i:02}] {byte:#04x} (rx {discarded:#04x} discarded)");
        }
        Ok(())
    }

    /// Clock in a whole block, sending `filler` for every byte
    fn read_block(&mut self, filler: u8) -> Result<[u8; BLOCK_SIZE], Error> {
        let mut block = [0u8; BLOCK_SIZE];
        for (i, slot) in block.iter_mut().enumerate() {
            *slot = self.exchange_byte(filler)?;
            trace!("rx[{i:02}] {:#04x}", *slot);
        }
        Ok(block)
    }
}

/// Control lines of the accelerator
pub trait GpioControl {
    /// Drive the LOAD line (true = high)
    fn set_load(&mut self, asserted: bool) -> Result<(), Error>;

    /// Sample the DONE line (true = high)
    fn done_asserted(&mut self) -> Result<bool, Error>;
}

/// Delay provider backed by `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

/// Monotonic time source used to bound the DONE wait
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&mut self) -> Duration;
}

/// Clock for targets without a timer
///
/// Always reads zero, so the DONE wait is bounded by the sum of the delays
/// the driver requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClock;

impl Clock for NoClock {
    fn now(&mut self) -> Duration {
        Duration::ZERO
    }
}

/// Clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Echoes each byte back inverted
    struct Loopback {
        sent: std::vec::Vec<u8>,
    }

    impl SpiBackend for Loopback {
        fn exchange_byte(&mut self, value: u8) -> Result<u8, Error> {
            self.sent.push(value);
            Ok(!value)
        }

        fn initialize(&mut self) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_write_block_order() {
        let mut bus = Loopback { sent: vec![] };
        let block: [u8; 16] = core::array::from_fn(|i| i as u8);
        bus.write_block(&block).unwrap();
        assert_eq!(bus.sent, block.to_vec());
    }

    #[test]
    fn test_read_block_uses_filler() {
        let mut bus = Loopback { sent: vec![] };
        let block = bus.read_block(0xA5).unwrap();
        assert_eq!(bus.sent, vec![0xA5; 16]);
        assert_eq!(block, [0x5A; 16]);
    }

    #[test]
    fn test_no_clock_stands_still() {
        let mut clock = NoClock;
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_advances() {
        let mut clock = StdClock::new();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(1));
        assert!(clock.now() >= first + Duration::from_millis(1));
    }
}
