//! Extended Hamming(22,16) SECDED block code
//!
//! A codeword carries 16 data bits in 22 slots. Slot 0 is the overall parity
//! bit, slots 1, 2, 4, 8 and 16 are sub-parity bits and the remaining 16
//! slots hold the data bits in their original order. Sub-parity bit `2^j`
//! makes every slot whose index has bit `j` set sum to an even number; the
//! overall parity bit makes the whole codeword even.

use crate::{FrameError, Result};
use hamfec_core::bits::Bit;
use serde::{Deserialize, Serialize};

/// Data bits per block
pub const DATA_BITS: usize = 16;

/// Bits per codeword
pub const CODEWORD_BITS: usize = 22;

/// Number of sub-parity bits (slots 1, 2, 4, 8, 16)
const SUB_PARITY_BITS: usize = 5;

/// 16 data bits, two characters LSB first
pub type DataBlock = [Bit; DATA_BITS];

/// 22-bit extended Hamming codeword
pub type Codeword = [Bit; CODEWORD_BITS];

/// Codeword slot for each data bit index
const DATA_SLOTS: [usize; DATA_BITS] = data_slots();

/// For each codeword slot, a mask of the sub-parity checks covering it
const COVERAGE: [u8; CODEWORD_BITS] = coverage();

const fn is_parity_slot(slot: usize) -> bool {
    slot == 0 || slot.is_power_of_two()
}

const fn data_slots() -> [usize; DATA_BITS] {
    let mut slots = [0; DATA_BITS];
    let mut slot = 0;
    let mut k = 0;
    while slot < CODEWORD_BITS {
        if !is_parity_slot(slot) {
            slots[k] = slot;
            k += 1;
        }
        slot += 1;
    }
    slots
}

const fn coverage() -> [u8; CODEWORD_BITS] {
    let mut table = [0u8; CODEWORD_BITS];
    let mut slot = 0;
    while slot < CODEWORD_BITS {
        let mut j = 0;
        while j < SUB_PARITY_BITS {
            if slot & (1 << j) != 0 {
                table[slot] |= 1 << j;
            }
            j += 1;
        }
        slot += 1;
    }
    table
}

/// Outcome of decoding one codeword, ordered by how much the block can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorStatus {
    /// Every parity check passed
    None,
    /// A single flipped bit was located and repaired
    Corrected,
    /// An error pattern was detected that cannot be located; data is best effort
    Uncorrectable,
}

/// Hamming(22,16) SECDED codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming2216;

impl Hamming2216 {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }

    /// Encode a 16-bit slice into a codeword
    pub fn encode(&self, data: &[Bit]) -> Result<Codeword> {
        let block: &DataBlock = data.try_into().map_err(|_| FrameError::InvalidBlockLength {
            expected: DATA_BITS,
            actual: data.len(),
        })?;
        Ok(self.encode_block(block))
    }

    /// Decode a 22-bit slice into data bits and an error status
    pub fn decode(&self, codeword: &[Bit]) -> Result<(DataBlock, ErrorStatus)> {
        let word: &Codeword = codeword.try_into().map_err(|_| FrameError::InvalidBlockLength {
            expected: CODEWORD_BITS,
            actual: codeword.len(),
        })?;
        Ok(self.decode_block(word))
    }

    /// Encode a data block
    pub fn encode_block(&self, data: &DataBlock) -> Codeword {
        let mut word = [0; CODEWORD_BITS];
        for (&bit, &slot) in data.iter().zip(DATA_SLOTS.iter()) {
            word[slot] = bit & 1;
        }

        // With the parity slots still zero the syndrome is exactly the set
        // of sub-parity bits needed to make each covered group even.
        let syndrome = syndrome(&word);
        for j in 0..SUB_PARITY_BITS {
            word[1 << j] = (syndrome >> j) & 1;
        }

        word[0] = overall_parity(&word);
        word
    }

    /// Decode a codeword, repairing a single bit error when one can be located.
    ///
    /// Uncorrectable words are not rejected: the data slots are returned as
    /// received so the caller can still use them.
    pub fn decode_block(&self, codeword: &Codeword) -> (DataBlock, ErrorStatus) {
        let mut word = *codeword;
        let parity = overall_parity(&word);
        let position = usize::from(syndrome(&word));

        let status = match (position, parity) {
            // an odd parity here means slot 0 itself flipped, which carries no data
            (0, _) => ErrorStatus::None,
            (position, 1) if position < CODEWORD_BITS => {
                word[position] ^= 1;
                ErrorStatus::Corrected
            }
            _ => ErrorStatus::Uncorrectable,
        };

        (extract_data(&word), status)
    }
}

/// Modulo-2 sum of every bit in the codeword
fn overall_parity(word: &Codeword) -> Bit {
    word.iter().fold(0, |acc, &bit| acc ^ (bit & 1))
}

/// Sub-parity check results packed as `sum(s_j * 2^j)`
fn syndrome(word: &Codeword) -> u8 {
    word.iter()
        .zip(COVERAGE.iter())
        .filter(|&(&bit, _)| bit & 1 == 1)
        .fold(0, |acc, (_, &mask)| acc ^ mask)
}

fn extract_data(word: &Codeword) -> DataBlock {
    let mut data = [0; DATA_BITS];
    for (bit, &slot) in data.iter_mut().zip(DATA_SLOTS.iter()) {
        *bit = word[slot] & 1;
    }
    data
}
