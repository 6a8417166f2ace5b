//! Repetition diversity combining
//!
//! Every codeword is transmitted twice. Each copy is decoded on its own and
//! the combiner keeps the copy whose decoder reported the lower
//! [`ErrorStatus`]. It never merges the two bit by bit.

use crate::hamming::{DataBlock, ErrorStatus};
use serde::{Deserialize, Serialize};

/// One decoded copy of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub block: DataBlock,
    pub status: ErrorStatus,
}

impl Decoded {
    pub fn new(block: DataBlock, status: ErrorStatus) -> Self {
        Self { block, status }
    }
}

impl From<(DataBlock, ErrorStatus)> for Decoded {
    fn from((block, status): (DataBlock, ErrorStatus)) -> Self {
        Self { block, status }
    }
}

/// Pick the more trustworthy of two decodes of the same block.
///
/// Ties go to the first copy.
pub fn combine(first: Decoded, second: Decoded) -> DataBlock {
    if first.status <= second.status {
        first.block
    } else {
        second.block
    }
}

/// Per-copy decode statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    pub clean_blocks: usize,
    pub corrected_errors: usize,
    pub uncorrectable_blocks: usize,
}

impl DecodeStats {
    /// Count one decode outcome
    pub fn record(&mut self, status: ErrorStatus) {
        match status {
            ErrorStatus::None => self.clean_blocks += 1,
            ErrorStatus::Corrected => self.corrected_errors += 1,
            ErrorStatus::Uncorrectable => self.uncorrectable_blocks += 1,
        }
    }

    /// Total decodes recorded
    pub fn total(&self) -> usize {
        self.clean_blocks + self.corrected_errors + self.uncorrectable_blocks
    }
}
