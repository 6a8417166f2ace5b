//! Error types for hamfec modem

use thiserror::Error;

/// Modem error types
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Invalid channel parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Channel length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Frame error: {0}")]
    Frame(#[from] hamfec_frame::FrameError),
}

/// Result type for hamfec modem operations
pub type Result<T> = std::result::Result<T, ModemError>;
