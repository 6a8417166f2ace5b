//! Antipodal mapping, Gaussian noise and soft-decision quantization

use crate::{ModemError, Result};
use hamfec_core::bits::Bit;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Maps bits to antipodal symbols: 0 -> -1.0, 1 -> +1.0
#[derive(Debug, Clone, Copy, Default)]
pub struct AntipodalMapper;

impl AntipodalMapper {
    pub fn map(&self, bits: &[Bit]) -> Vec<f64> {
        bits.iter()
            .map(|&bit| if bit & 1 == 0 { -1.0 } else { 1.0 })
            .collect()
    }

    /// Hard decision on received symbols, threshold at zero
    pub fn decide(&self, symbols: &[f64]) -> Vec<Bit> {
        symbols.iter().map(|&y| Bit::from(y >= 0.0)).collect()
    }
}

/// Additive white Gaussian noise with zero mean and standard deviation sigma.
///
/// Seeded sources produce the same noise sequence on every run.
#[derive(Debug, Clone)]
pub struct AwgnSource {
    sigma: f64,
    distribution: Normal<f64>,
    rng: StdRng,
}

impl AwgnSource {
    /// Create a noise source with standard deviation `sigma`
    pub fn new(sigma: f64, seed: Option<u64>) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid noise standard deviation: {}", sigma),
            });
        }

        let distribution = Normal::new(0.0, sigma).map_err(|e| ModemError::InvalidParameters {
            msg: format!("Invalid noise distribution: {}", e),
        })?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            sigma,
            distribution,
            rng,
        })
    }

    /// Create a noise source from the variance sigma^2
    pub fn from_variance(variance: f64, seed: Option<u64>) -> Result<Self> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid noise variance: {}", variance),
            });
        }
        Self::new(variance.sqrt(), seed)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Add an independent noise sample to every symbol
    pub fn apply(&mut self, symbols: &mut [f64]) {
        if self.sigma == 0.0 {
            return;
        }
        for symbol in symbols.iter_mut() {
            *symbol += self.distribution.sample(&mut self.rng);
        }
    }
}

/// Rescales antipodal observations onto `2^q` integer levels
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    quant_level: u32,
}

impl Quantizer {
    /// Create a quantizer with `quant_level` bits of resolution
    pub fn new(quant_level: u32) -> Result<Self> {
        if !(1..=16).contains(&quant_level) {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid quantization resolution: {} bits", quant_level),
            });
        }
        Ok(Self { quant_level })
    }

    pub fn quant_level(&self) -> u32 {
        self.quant_level
    }

    /// Highest level, `2^q - 1`
    pub fn max_level(&self) -> u32 {
        (1u32 << self.quant_level) - 1
    }

    /// `((y + 1) / 2) * (2^q - 1)`, rounded and clamped to the level range
    pub fn quantize(&self, symbols: &[f64]) -> Vec<u32> {
        let max = f64::from(self.max_level());
        symbols
            .iter()
            .map(|&y| (((y + 1.0) / 2.0) * max).round().clamp(0.0, max) as u32)
            .collect()
    }
}
