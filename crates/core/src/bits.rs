//! Character <-> bit packing
//!
//! Every character is carried as exactly eight bits, least-significant bit
//! first. Only code points 0..=255 are representable.

use crate::{CoreError, Result};

/// A single bit, always 0 or 1
pub type Bit = u8;

/// Bits carried per character
pub const BITS_PER_CHAR: usize = 8;

/// Expand a character into its eight bits, LSB first
pub fn char_to_bits(ch: char) -> Result<[Bit; BITS_PER_CHAR]> {
    let code = u8::try_from(u32::from(ch)).map_err(|_| CoreError::OutOfRangeCharacter { ch })?;

    let mut bits = [0; BITS_PER_CHAR];
    for (k, bit) in bits.iter_mut().enumerate() {
        *bit = (code >> k) & 1;
    }
    Ok(bits)
}

/// Rebuild a character from eight bits, LSB first
pub fn bits_to_char(bits: &[Bit; BITS_PER_CHAR]) -> char {
    let code = bits
        .iter()
        .enumerate()
        .fold(0u8, |acc, (k, &bit)| acc | ((bit & 1) << k));
    char::from(code)
}

/// Concatenate the bit groups of every character in message order
pub fn pack_message(message: &str) -> Result<Vec<Bit>> {
    let mut bits = Vec::with_capacity(message.chars().count() * BITS_PER_CHAR);
    for ch in message.chars() {
        bits.extend_from_slice(&char_to_bits(ch)?);
    }
    Ok(bits)
}

/// Group bits into runs of eight and turn each run back into a character
pub fn unpack_message(bits: &[Bit]) -> Result<String> {
    if bits.len() % BITS_PER_CHAR != 0 {
        return Err(CoreError::InvalidBitCount { len: bits.len() });
    }

    Ok(bits
        .chunks_exact(BITS_PER_CHAR)
        .map(|chunk| {
            let mut group = [0; BITS_PER_CHAR];
            group.copy_from_slice(chunk);
            bits_to_char(&group)
        })
        .collect())
}
