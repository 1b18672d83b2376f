//! Error types for the core primitives

use thiserror::Error;

/// Result type for core operations
pub type PlistResult<T> = Result<T, PlistError>;

/// Errors raised by the codecs and parsers in this crate
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlistError {
    /// Styled text payload is not valid base64
    #[error("invalid base64 in styled text payload: {0}")]
    InvalidBase64(String),

    /// Decoded styled text payload is not UTF-8
    #[error("styled text payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Keystroke description could not be parsed
    #[error("invalid keystroke '{input}': {reason}")]
    InvalidKeyStroke { input: String, reason: String },

    /// Screen area is missing a required coordinate
    #[error("invalid screen area: {0}")]
    InvalidScreenArea(String),
}
