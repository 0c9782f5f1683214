//! embedded-hal 1.0 accelerator backend
//!
//! This backend uses `embedded_hal::spi::SpiDevice` (eh1) for the byte
//! exchange, an `OutputPin` for LOAD and an `InputPin` for DONE.
//! The accelerator frames transfers with LOAD, so the chip select
//! managed by the `SpiDevice` is not part of the handshake.

use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use super::{GpioControl, SpiBackend};
use crate::error::Error;

/// embedded-hal 1.0 accelerator backend
///
/// * `SPI`  – SPI device, mode and clock configured by the HAL
/// * `LOAD` – LOAD control line (active high)
/// * `DONE` – DONE status line (active high)
pub struct Eh1Backend<SPI, LOAD, DONE> {
    spi: SPI,
    load: LOAD,
    done: DONE,
}

impl<SPI, LOAD, DONE> Eh1Backend<SPI, LOAD, DONE>
where
    SPI: SpiDevice,
    LOAD: OutputPin,
    DONE: InputPin,
{
    /// Create a new eh1 backend
    pub fn new(spi: SPI, load: LOAD, done: DONE) -> Self {
        Self { spi, load, done }
    }

    /// Give the peripherals back
    pub fn release(self) -> (SPI, LOAD, DONE) {
        (self.spi, self.load, self.done)
    }
}

impl<SPI, LOAD, DONE> GpioControl for Eh1Backend<SPI, LOAD, DONE>
where
    SPI: SpiDevice,
    LOAD: OutputPin,
    DONE: InputPin,
{
    fn set_load(&mut self, asserted: bool) -> Result<(), Error> {
        if asserted {
            self.load.set_high().map_err(|_| Error::Gpio)
        } else {
            self.load.set_low().map_err(|_| Error::Gpio)
        }
    }

    fn done_asserted(&mut self) -> Result<bool, Error> {
        self.done.is_high().map_err(|_| Error::Gpio)
    }
}

impl<SPI, LOAD, DONE> SpiBackend for Eh1Backend<SPI, LOAD, DONE>
where
    SPI: SpiDevice,
    LOAD: OutputPin,
    DONE: InputPin,
{
    fn exchange_byte(&mut self, value: u8) -> Result<u8, Error> {
        let mut frame = [value];

        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|_| Error::Spi)?;

        Ok(frame[0])
    }

    fn initialize(&mut self) -> Result<(), Error> {
        // Pin directions are fixed by the HAL types; only the idle level is ours
        self.load.set_low().map_err(|_| Error::InitializationFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::protocol::transaction::BusOp;
    use embedded_hal::{digital, spi};
    use std::{cell::RefCell, collections::VecDeque, rc::Rc};

    type Log = Rc<RefCell<Vec<BusOp>>>;

    struct MockSpi {
        log: Log,
        responses: VecDeque<u8>,
        fail: bool,
    }

    impl spi::ErrorType for MockSpi {
        type Error = spi::ErrorKind;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [spi::Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(spi::ErrorKind::Overrun);
            }
            for op in operations.iter_mut() {
                match op {
                    spi::Operation::TransferInPlace(buf) => {
                        for byte in buf.iter_mut() {
                            let received = self.responses.pop_front().unwrap_or(0xFF);
                            self.log.borrow_mut().push(BusOp::exchange(*byte, received));
                            *byte = received;
                        }
                    }
                    _ => panic!("unexpected SPI operation"),
                }
            }
            Ok(())
        }
    }

    struct MockLoad {
        log: Log,
    }

    impl digital::ErrorType for MockLoad {
        type Error = digital::ErrorKind;
    }

    impl OutputPin for MockLoad {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusOp::set_load(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusOp::set_load(true));
            Ok(())
        }
    }

    struct MockDone {
        log: Log,
        levels: VecDeque<bool>,
    }

    impl digital::ErrorType for MockDone {
        type Error = digital::ErrorKind;
    }

    impl InputPin for MockDone {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            let level = self.levels.pop_front().ok_or(digital::ErrorKind::Other)?;
            self.log.borrow_mut().push(BusOp::poll_done(level));
            Ok(level)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|level| !level)
        }
    }

    fn backend(responses: &[u8], levels: &[bool]) -> (Eh1Backend<MockSpi, MockLoad, MockDone>, Log) {
        let log: Log = Rc::default();
        let spi = MockSpi {
            log: log.clone(),
            responses: responses.iter().copied().collect(),
            fail: false,
        };
        let load = MockLoad { log: log.clone() };
        let done = MockDone {
            log: log.clone(),
            levels: levels.iter().copied().collect(),
        };
        (Eh1Backend::new(spi, load, done), log)
    }

    #[test]
    fn test_exchange_byte() {
        let (mut be, log) = backend(&[0x39, 0x25], &[]);
        assert_eq!(be.exchange_byte(0x00).unwrap(), 0x39);
        assert_eq!(be.exchange_byte(0x2B).unwrap(), 0x25);
        assert_eq!(
            *log.borrow(),
            vec![BusOp::exchange(0x00, 0x39), BusOp::exchange(0x2B, 0x25)]
        );
    }

    #[test]
    fn test_lines() {
        let (mut be, log) = backend(&[], &[false, true]);
        be.initialize().unwrap();
        be.set_load(true).unwrap();
        be.set_load(false).unwrap();
        assert!(!be.done_asserted().unwrap());
        assert!(be.done_asserted().unwrap());
        assert_eq!(
            *log.borrow(),
            vec![
                BusOp::set_load(false),
                BusOp::set_load(true),
                BusOp::set_load(false),
                BusOp::poll_done(false),
                BusOp::poll_done(true),
            ]
        );
    }

    #[test]
    fn test_errors_are_mapped() {
        let (be, _log) = backend(&[], &[]);
        let (mut spi, load, done) = be.release();
        spi.fail = true;
        let mut be = Eh1Backend::new(spi, load, done);
        assert!(matches!(be.exchange_byte(0x00), Err(Error::Spi)));
        // DONE mock has no levels queued
        assert!(matches!(be.done_asserted(), Err(Error::Gpio)));
    }
}
