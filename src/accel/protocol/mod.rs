/// Protocol module - hardware-independent accelerator handshake definitions
///
/// This module describes the phases of one encryption session and the
/// transport operations it is made of, without depending on any specific
/// hardware backend (embedded-hal, simulator, ...)

pub mod phase;
pub mod transaction;

use crate::block::BLOCK_SIZE;

/// Bytes clocked out while LOAD is asserted: plaintext then key
pub const LOAD_BYTES: usize = BLOCK_SIZE * 2;

/// Bytes clocked in after DONE is observed
pub const READ_BYTES: usize = BLOCK_SIZE;

/// Filler written during the read phase. The accelerator ignores it.
pub const DEFAULT_DUMMY_BYTE: u8 = 0x00;
