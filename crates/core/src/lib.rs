//! hamfec core - bit primitives shared by every layer of the link
//!
//! Characters travel the link as groups of eight bits, least-significant
//! bit first. This crate owns that mapping and the error type for it.

pub mod bits;
pub mod error;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        bits::{bits_to_char, char_to_bits, pack_message, unpack_message, Bit, BITS_PER_CHAR},
        error::{CoreError, Result},
    };
}
