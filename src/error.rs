//! Error types for narrator

use thiserror::Error;

/// Main error type for narrator
///
/// Every failure path in the crate funnels into this one type, including
/// the base64 decode step that the synthesis service response goes through.
#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Synthesis service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Malformed audio payload: {0}")]
    MalformedAudio(#[from] base64::DecodeError),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Audio output error: {0}")]
    Audio(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for narrator operations
pub type Result<T> = std::result::Result<T, NarratorError>;

impl From<String> for NarratorError {
    fn from(s: String) -> Self {
        NarratorError::Other(s)
    }
}

impl From<&str> for NarratorError {
    fn from(s: &str) -> Self {
        NarratorError::Other(s.to_string())
    }
}
