#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod accel;
pub mod block;
pub mod error;
pub mod kat;
pub mod verify;

#[cfg(feature = "sim")]
pub mod sim;

pub use accel::backend::{Clock, GpioControl, NoClock, SpiBackend};
pub use accel::driver::{AccelDriver, DriverConfig};
pub use accel::protocol::phase::Phase;
pub use block::{BLOCK_SIZE, Ciphertext, Key, Plaintext};
pub use embedded_hal::delay as eh_delay;
pub use embedded_hal::digital as eh_digital;
pub use embedded_hal::spi as eh_spi;
pub use error::Error;
pub use verify::{Report, Verdict};
