//! Error types for astraeus-chat

use thiserror::Error;

use crate::turn::TurnId;

/// Result type alias using astraeus-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during turn management
#[derive(Error, Debug)]
pub enum Error {
    /// Submission rejected: input was empty or whitespace-only
    #[error("query is empty")]
    EmptyQuery,

    /// Submission rejected: another response is still in flight
    #[error("another response is still streaming")]
    Busy,

    /// An operation referenced a turn that does not exist
    #[error("no such turn: {0}")]
    UnknownTurn(TurnId),
}

impl Error {
    /// Check if this is a submission rejection (no turn was created,
    /// no request was made).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::EmptyQuery | Error::Busy)
    }
}
