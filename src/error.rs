//! Error types for the chat client.
//!
//! Decode failures never show up here: the codec degrades them to plain text.
//! Transport failures are reported as connection state and retried, so the
//! errors that stop the client are a bad room address and
//! `UnsupportedEnvironment`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The runtime cannot open the requested transport at all; retrying is pointless.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// The configured host is not a bare `name[:port]` authority.
    #[error("invalid chat host: {0:?}")]
    InvalidHost(String),

    #[error("invalid room url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport closed")]
    TransportClosed,
}

impl ChatError {
    /// Whether the error should stop the client instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEnvironment(_) | Self::InvalidHost(_) | Self::InvalidUrl(_)
        )
    }
}
