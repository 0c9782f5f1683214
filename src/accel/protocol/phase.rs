//! Session phases of the accelerator handshake

use crate::error::Error;

/// Phase of one encryption session
///
/// ```text
/// Idle -> Loading -> WaitingDone -> Reading -> Complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No session in progress, LOAD is low
    #[default]
    Idle,
    /// LOAD asserted, plaintext and key being clocked out
    Loading,
    /// LOAD released, polling DONE
    WaitingDone,
    /// DONE seen, ciphertext being clocked in
    Reading,
    /// Ciphertext fully received
    Complete,
}

impl Phase {
    /// The only phase reachable from `self`, or `None` once complete
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Loading),
            Self::Loading => Some(Self::WaitingDone),
            Self::WaitingDone => Some(Self::Reading),
            Self::Reading => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Move to `to`, rejecting anything but the single forward edge
    pub fn advance(&mut self, to: Phase) -> Result<(), Error> {
        if self.next() != Some(to) {
            return Err(Error::InvalidPhase { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    /// Whether the LOAD line is asserted while in this phase
    pub fn load_asserted(self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether bytes are exchanged on the bus in this phase
    pub fn transfers_bytes(self) -> bool {
        matches!(self, Self::Loading | Self::Reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_sequence() {
        let mut phase = Phase::default();
        assert_eq!(phase, Phase::Idle);
        for to in [Phase::Loading, Phase::WaitingDone, Phase::Reading, Phase::Complete] {
            phase.advance(to).unwrap();
            assert_eq!(phase, to);
        }
        assert_eq!(phase.next(), None);
    }

    #[test]
    fn test_rejects_skips_and_reversals() {
        let mut phase = Phase::Idle;
        assert!(matches!(
            phase.advance(Phase::Reading),
            Err(Error::InvalidPhase { from: Phase::Idle, to: Phase::Reading })
        ));
        assert_eq!(phase, Phase::Idle);

        phase = Phase::WaitingDone;
        assert!(phase.advance(Phase::Loading).is_err());
        assert!(phase.advance(Phase::WaitingDone).is_err());

        phase = Phase::Complete;
        assert!(phase.advance(Phase::Idle).is_err());
    }

    #[test]
    fn test_line_and_bus_activity() {
        assert!(Phase::Loading.load_asserted());
        assert!(!Phase::WaitingDone.load_asserted());
        assert!(Phase::Loading.transfers_bytes());
        assert!(Phase::Reading.transfers_bytes());
        assert!(!Phase::WaitingDone.transfers_bytes());
        assert!(!Phase::Idle.transfers_bytes());
    }
}
