//! Error types for astraeus-stream

use thiserror::Error;

/// Result type alias using astraeus-stream Error
pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level failures while talking to the insights backend.
///
/// Malformed stream fragments are not errors: the decoder skips them.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request or body read failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned status {code}")]
    Status { code: u16 },

    /// Stream was aborted before completion
    #[error("request aborted")]
    Aborted,
}

impl Error {
    /// Create a status error from a status code
    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }
}
