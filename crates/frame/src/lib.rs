//! hamfec frame - block and trellis coding for the simulated link
//!
//! The outer code is an extended Hamming(22,16) SECDED block code whose
//! codewords are sent twice; [`diversity`] picks the better of the two
//! decodes. The inner code is a rate-1/n convolutional code with a
//! soft-decision Viterbi decoder.

pub mod convolutional;
pub mod diversity;
pub mod error;
pub mod hamming;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        convolutional::{ConvolutionalCode, SoftViterbiDecoder},
        diversity::{combine, DecodeStats, Decoded},
        error::{FrameError, Result},
        hamming::{Codeword, DataBlock, ErrorStatus, Hamming2216, CODEWORD_BITS, DATA_BITS},
    };
}
