//! Link stages that carry hard bits from the outer encoder to the outer decoder

use crate::awgn::{AntipodalMapper, AwgnSource, Quantizer};
use crate::{ModemError, Result};
use hamfec_core::bits::Bit;
use hamfec_frame::convolutional::{ConvolutionalCode, SoftViterbiDecoder};
use tracing::debug;

/// Generic channel trait
pub trait Channel {
    /// Carry `bits` across the link and return the receiver's decisions.
    ///
    /// The returned sequence has the same length as the input.
    fn transfer(&mut self, bits: &[Bit]) -> Result<Vec<Bit>>;

    /// Short human-readable name
    fn name(&self) -> &str;
}

/// Noise-free wire
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealChannel;

impl Channel for IdealChannel {
    fn transfer(&mut self, bits: &[Bit]) -> Result<Vec<Bit>> {
        Ok(bits.to_vec())
    }

    fn name(&self) -> &str {
        "ideal"
    }
}

/// Uncoded antipodal signalling over AWGN with hard decisions
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    mapper: AntipodalMapper,
    noise: AwgnSource,
}

impl AwgnChannel {
    pub fn new(noise: AwgnSource) -> Self {
        Self {
            mapper: AntipodalMapper,
            noise,
        }
    }
}

impl Channel for AwgnChannel {
    fn transfer(&mut self, bits: &[Bit]) -> Result<Vec<Bit>> {
        let mut symbols = self.mapper.map(bits);
        self.noise.apply(&mut symbols);
        let received = self.mapper.decide(&symbols);

        debug!(
            "{} channel: {} bit errors in {} bits (sigma {:.3})",
            self.name(),
            received.iter().zip(bits).filter(|(a, b)| a != b).count(),
            bits.len(),
            self.noise.sigma()
        );
        Ok(received)
    }

    fn name(&self) -> &str {
        "awgn"
    }
}

/// Convolutionally coded antipodal signalling over AWGN.
///
/// The bits are flushed with `decision_depth - 1` zeros, encoded, mapped to
/// antipodal symbols, corrupted, quantized and Viterbi decoded back to the
/// original length.
#[derive(Debug, Clone)]
pub struct CodedAwgnChannel {
    code: ConvolutionalCode,
    decoder: SoftViterbiDecoder,
    mapper: AntipodalMapper,
    noise: AwgnSource,
    quantizer: Quantizer,
}

impl CodedAwgnChannel {
    pub fn new(
        code: ConvolutionalCode,
        decision_depth: usize,
        quant_level: u32,
        noise: AwgnSource,
    ) -> Result<Self> {
        let quantizer = Quantizer::new(quant_level)?;
        let decoder = SoftViterbiDecoder::new(code.clone(), decision_depth, quant_level)?;

        Ok(Self {
            code,
            decoder,
            mapper: AntipodalMapper,
            noise,
            quantizer,
        })
    }

    /// K=8 rate 1/3 code, decision depth 75, 5-bit soft decisions
    pub fn with_defaults(noise: AwgnSource) -> Result<Self> {
        Self::new(ConvolutionalCode::rate_1_3_k8(), 75, 5, noise)
    }

    pub fn code(&self) -> &ConvolutionalCode {
        &self.code
    }
}

impl Channel for CodedAwgnChannel {
    fn transfer(&mut self, bits: &[Bit]) -> Result<Vec<Bit>> {
        let flush = self.decoder.decision_depth() - 1;
        let mut padded = Vec::with_capacity(bits.len() + flush);
        padded.extend_from_slice(bits);
        padded.resize(bits.len() + flush, 0);

        let (encoded, _) = self.code.encode(&padded, 0);
        let mut symbols = self.mapper.map(&encoded);
        self.noise.apply(&mut symbols);
        let levels = self.quantizer.quantize(&symbols);
        let decoded = self.decoder.decode(&levels)?;

        if decoded.len() != bits.len() {
            return Err(ModemError::LengthMismatch {
                expected: bits.len(),
                actual: decoded.len(),
            });
        }

        debug!(
            "{} channel: {} coded symbols, {} residual bit errors (sigma {:.3})",
            self.name(),
            encoded.len(),
            decoded.iter().zip(bits).filter(|(a, b)| a != b).count(),
            self.noise.sigma()
        );
        Ok(decoded)
    }

    fn name(&self) -> &str {
        "coded-awgn"
    }
}
