//! Error types for hamfec frame

use thiserror::Error;

/// Frame processing error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid block length: expected {expected} bits, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("Invalid convolutional code parameters: {msg}")]
    InvalidCodeParameters { msg: String },

    #[error("Invalid soft-decision input: {msg}")]
    InvalidSoftInput { msg: String },
}

/// Result type for hamfec frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
