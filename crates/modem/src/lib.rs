//! hamfec modem - everything between the outer code and the receiver
//!
//! Bits leaving the Hamming layer cross a [`channel::Channel`]. The channels
//! here range from a perfect wire to antipodal signalling over additive white
//! Gaussian noise protected by a convolutional code.

pub mod awgn;
pub mod channel;
pub mod error;

pub use error::{ModemError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        awgn::{AntipodalMapper, AwgnSource, Quantizer},
        channel::{AwgnChannel, Channel, CodedAwgnChannel, IdealChannel},
        error::{ModemError, Result},
    };
}
