//! Error types for descramble core.

use std::{error::Error, fmt};

/// Error type for descramble core operations.
#[derive(Debug)]
pub enum DescrambleError {
    /// Input failed validation at the engine boundary.
    InvalidInput(String),
    /// A configuration document could not be parsed or is inconsistent.
    Config(String),
}

impl fmt::Display for DescrambleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Config(message) => write!(f, "configuration error: {message}"),
        }
    }
}

impl Error for DescrambleError {}

impl From<serde_json::Error> for DescrambleError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

/// Convenience result type for descramble core.
pub type Result<T> = std::result::Result<T, DescrambleError>;
