//! Error types for hamfec core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Character {ch:?} does not fit in 8 bits")]
    OutOfRangeCharacter { ch: char },

    #[error("Bit count {len} is not a whole number of characters")]
    InvalidBitCount { len: usize },
}

/// Result type for hamfec core operations
pub type Result<T> = std::result::Result<T, CoreError>;
