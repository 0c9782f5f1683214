use thiserror::Error as DeriveError;

use crate::accel::protocol::phase::Phase;

#[derive(DeriveError, Debug)]
pub enum Error {
    #[error("SPI transfer failed")]
    Spi,

    #[error("GPIO access failed")]
    Gpio,

    #[error("Invalid block length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex string: {0}")]
    InvalidHex(hex::FromHexError),

    #[error("Accelerator did not assert DONE after {polls} polls ({waited_ns} ns)")]
    Timeout { polls: u32, waited_ns: u64 },

    #[error("Invalid protocol phase transition: {from:?} -> {to:?}")]
    InvalidPhase { from: Phase, to: Phase },

    #[error("Device initialization failed")]
    InitializationFailed,
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Self::InvalidHex(err)
    }
}
