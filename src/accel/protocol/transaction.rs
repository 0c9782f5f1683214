//! Bus operation records for the accelerator handshake
//!
//! A `BusOp` is the hardware-independent form of one transport primitive
//! call. Backends that record traffic (the simulator, test mocks) use it
//! to expose the exact sequence seen on the wire.

/// One transport primitive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    /// LOAD line driven to a level
    SetLoad {
        asserted: bool,
    },
    /// DONE line sampled
    PollDone {
        asserted: bool,
    },
    /// Full-duplex single byte exchange
    Exchange {
        sent: u8,
        received: u8,
    },
}

impl BusOp {
    /// Record a LOAD write
    pub fn set_load(asserted: bool) -> Self {
        Self::SetLoad { asserted }
    }

    /// Record a DONE sample
    pub fn poll_done(asserted: bool) -> Self {
        Self::PollDone { asserted }
    }

    /// Record a byte exchange
    pub fn exchange(sent: u8, received: u8) -> Self {
        Self::Exchange { sent, received }
    }

    /// Byte clocked out, if this is an exchange
    pub fn sent(&self) -> Option<u8> {
        match self {
            Self::Exchange { sent, .. } => Some(*sent),
            _ => None,
        }
    }

    /// Byte clocked in, if this is an exchange
    pub fn received(&self) -> Option<u8> {
        match self {
            Self::Exchange { received, .. } => Some(*received),
            _ => None,
        }
    }

    /// Whether this operation moved a byte over the bus
    pub fn is_exchange(&self) -> bool {
        matches!(self, Self::Exchange { .. })
    }
}
