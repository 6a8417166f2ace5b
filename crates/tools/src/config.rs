//! Simulation configuration

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use hamfec_frame::convolutional::{ConvolutionalCode, MAX_DECISION_DEPTH};
use hamfec_modem::prelude::*;

use crate::common::{load_config, save_config};

/// What sits between the Hamming encoder and decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelModel {
    /// No noise at all
    Ideal,
    /// Uncoded antipodal symbols over AWGN, hard decisions
    Awgn,
    /// Convolutional code over AWGN, soft-decision Viterbi
    Coded,
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Noise variance sigma^2
    pub variance: f64,
    /// Noise seed; a fresh seed is drawn when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub channel: ChannelModel,
    /// Trellis stages considered before a bit is released
    pub decision_depth: usize,
    /// Soft-decision resolution in bits
    pub quant_level: u32,
    /// Generator taps, newest input first
    pub generators: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            variance: 0.5,
            seed: None,
            channel: ChannelModel::Coded,
            decision_depth: 75,
            quant_level: 5,
            generators: vec![
                "11110111".to_string(),
                "11011001".to_string(),
                "10010101".to_string(),
            ],
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML or JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        save_config(self, path)
    }

    /// Noise standard deviation
    pub fn sigma(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn code(&self) -> Result<ConvolutionalCode> {
        ConvolutionalCode::from_binary_strings(self.generators.as_slice()).context("Invalid generators")
    }

    /// Check every parameter before any channel is built
    pub fn validate(&self) -> Result<()> {
        if !self.variance.is_finite() || self.variance < 0.0 {
            anyhow::bail!("Invalid noise variance: {}", self.variance);
        }
        if !(1..=MAX_DECISION_DEPTH).contains(&self.decision_depth) {
            anyhow::bail!(
                "Decision depth {} outside 1..={}",
                self.decision_depth,
                MAX_DECISION_DEPTH
            );
        }
        if !(1..=16).contains(&self.quant_level) {
            anyhow::bail!("Invalid quantization resolution: {} bits", self.quant_level);
        }
        self.code()?;
        Ok(())
    }

    /// Build the configured channel
    pub fn build_channel(&self) -> Result<Box<dyn Channel>> {
        self.validate()?;

        let channel: Box<dyn Channel> = match self.channel {
            ChannelModel::Ideal => Box::new(IdealChannel),
            ChannelModel::Awgn => {
                let noise = AwgnSource::from_variance(self.variance, self.seed)?;
                Box::new(AwgnChannel::new(noise))
            }
            ChannelModel::Coded => {
                let noise = AwgnSource::from_variance(self.variance, self.seed)?;
                Box::new(CodedAwgnChannel::new(
                    self.code()?,
                    self.decision_depth,
                    self.quant_level,
                    noise,
                )?)
            }
        };

        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.channel, ChannelModel::Coded);
        assert_eq!(config.decision_depth, 75);
        assert_eq!(config.quant_level, 5);
        assert_eq!(config.code().unwrap(), ConvolutionalCode::rate_1_3_k8());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SimConfig {
            variance: 0.75,
            seed: Some(42),
            channel: ChannelModel::Awgn,
            ..SimConfig::default()
        };

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        assert_eq!(SimConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig {
            seed: Some(7),
            channel: ChannelModel::Ideal,
            ..SimConfig::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");

        config.save_to_file(&path).unwrap();
        assert_eq!(SimConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "variance = 2.0\nchannel = \"awgn\"\n").unwrap();

        let config = SimConfig::from_file(&path).unwrap();
        assert_eq!(config.variance, 2.0);
        assert_eq!(config.channel, ChannelModel::Awgn);
        assert_eq!(config.decision_depth, 75);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_validation() {
        let bad = [
            SimConfig { variance: -1.0, ..SimConfig::default() },
            SimConfig { variance: f64::INFINITY, ..SimConfig::default() },
            SimConfig { decision_depth: 0, ..SimConfig::default() },
            SimConfig { decision_depth: 100_000_000, ..SimConfig::default() },
            SimConfig { quant_level: 0, ..SimConfig::default() },
            SimConfig { generators: vec![], ..SimConfig::default() },
            SimConfig { generators: vec!["1102".to_string()], ..SimConfig::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
            assert!(config.build_channel().is_err());
        }
    }

    #[test]
    fn test_oversized_depth_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "decision_depth = 100000000\n").unwrap();

        let err = SimConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Decision depth"));
    }

    #[test]
    fn test_built_channels_carry_a_message() {
        for channel in [ChannelModel::Ideal, ChannelModel::Awgn, ChannelModel::Coded] {
            let config = SimConfig {
                variance: 0.0,
                seed: Some(1),
                channel,
                ..SimConfig::default()
            };
            let mut link = config.build_channel().unwrap();
            let report = Pipeline::new().run("73 DE HAMFEC", link.as_mut()).unwrap();
            assert_eq!(report.recovered, "73 DE HAMFEC");
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SimConfig {
            variance: 3.0,
            seed: Some(1234),
            ..SimConfig::default()
        };
        let message = "reproducible noise";

        let first = Pipeline::new()
            .run(message, config.build_channel().unwrap().as_mut())
            .unwrap();
        let second = Pipeline::new()
            .run(message, config.build_channel().unwrap().as_mut())
            .unwrap();
        assert_eq!(first, second);
    }
}
