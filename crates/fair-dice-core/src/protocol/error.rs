//! Protocol error taxonomy.

use thiserror::Error;

/// Errors from commit-reveal rounds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("invalid range {0}: a round needs at least one possible value")]
    InvalidRange(u32),

    #[error("value {value} is outside 0..{range}")]
    ContributionOutOfRange { value: u32, range: u32 },

    #[error("protocol misuse: {0}")]
    ProtocolMisuse(String),

    #[error("secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),
}

impl ProtocolError {
    pub(crate) fn misuse(msg: impl Into<String>) -> Self {
        ProtocolError::ProtocolMisuse(msg.into())
    }

    /// Usage errors the caller can recover from by asking again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidRange(_) | ProtocolError::ContributionOutOfRange { .. }
        )
    }
}
