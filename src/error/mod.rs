//! Crate-wide error type and categorization.

use thiserror::Error;

/// Result type alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories, used to tag structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Socket/IO failures.
    Network,
    /// Malformed or inconsistent wire frames.
    Codec,
    /// Violations of the ring/token/phase discipline.
    Protocol,
    /// Configuration resolution failures.
    Configuration,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame: {0}")]
    Codec(String),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Category used for structured logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Network,
            Self::Codec(_) => ErrorCategory::Codec,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Config(_) => ErrorCategory::Configuration,
        }
    }
}
