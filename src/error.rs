//! Error handling and custom error types
//!
//! Every adapter failure collapses into one [`Error`] carrying an [`ErrorKind`]
//! and a user-facing message. Provider-native error shapes never escape the
//! adapter boundary.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RateLimit,
    EmptyResponse,
    UnrecognizedResponse,
    MissingInput,
    MediaFetch,
    NoAsset,
    Download,
    Transport,
    Timeout,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::RateLimit => "RateLimitError",
            ErrorKind::EmptyResponse => "EmptyResponseError",
            ErrorKind::UnrecognizedResponse => "UnrecognizedResponseError",
            ErrorKind::MissingInput => "MissingInputError",
            ErrorKind::MediaFetch => "MediaFetchError",
            ErrorKind::NoAsset => "NoAssetError",
            ErrorKind::Download => "DownloadError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Cancelled => "CancelledError",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    EmptyResponse(String),

    /// `raw` keeps the provider payload for diagnostics.
    #[error("{message}")]
    UnrecognizedResponse { message: String, raw: String },

    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    MediaFetch(String),

    #[error("{0}")]
    NoAsset(String),

    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RateLimit(_) => ErrorKind::RateLimit,
            Error::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Error::UnrecognizedResponse { .. } => ErrorKind::UnrecognizedResponse,
            Error::MissingInput(_) => ErrorKind::MissingInput,
            Error::MediaFetch(_) => ErrorKind::MediaFetch,
            Error::NoAsset(_) => ErrorKind::NoAsset,
            Error::Download(_) => ErrorKind::Download,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Human-readable message suitable for a dismissible UI notice.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Raw provider payload, when the failure preserved one.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Error::UnrecognizedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
