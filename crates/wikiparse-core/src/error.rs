//! Error types for wikiparse

use thiserror::Error;

use crate::enums::ErrorCode;

/// Main error type for wikiparse operations
#[derive(Error, Debug)]
pub enum WikiError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A parse call was abandoned
    #[error("line {line}: {code}")]
    Parse {
        /// What went wrong
        code: ErrorCode,
        /// 1-based input line at the point of failure
        line: usize,
    },
}

impl WikiError {
    /// The parse error code, if this error came from a parse call.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            WikiError::Parse { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for wikiparse operations
pub type Result<T> = std::result::Result<T, WikiError>;
