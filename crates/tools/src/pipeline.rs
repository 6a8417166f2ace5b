//! End-to-end message pipeline
//!
//! message -> bits -> 16-bit blocks -> 22-bit codewords -> two copies ->
//! channel -> per-copy decode -> combine -> bits -> message

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hamfec_core::prelude::*;
use hamfec_frame::prelude::*;
use hamfec_modem::channel::Channel;

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub original: String,
    pub recovered: String,
    /// Original positions whose character was not recovered
    pub errors: usize,
    /// errors / recovered length
    pub error_rate: f64,
    /// Hamming blocks per copy
    pub blocks: usize,
    pub copy_a: DecodeStats,
    pub copy_b: DecodeStats,
}

impl PipelineReport {
    pub fn message_len(&self) -> usize {
        self.original.chars().count()
    }

    pub fn error_rate_percent(&self) -> f64 {
        100.0 * self.error_rate
    }
}

/// Hamming(22,16) with 2x repetition around an arbitrary channel
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    codec: Hamming2216,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            codec: Hamming2216::new(),
        }
    }

    /// Pack and encode a message into one copy of its codewords.
    ///
    /// An odd character count is padded with a NUL so the last block is full.
    pub fn encode(&self, message: &str) -> Result<Vec<Bit>> {
        let mut bits = pack_message(message).context("Failed to pack message")?;
        if bits.len() % DATA_BITS != 0 {
            bits.resize(bits.len() + BITS_PER_CHAR, 0);
        }

        let mut encoded = Vec::with_capacity(bits.len() / DATA_BITS * CODEWORD_BITS);
        for block in bits.chunks_exact(DATA_BITS) {
            encoded.extend_from_slice(&self.codec.encode(block)?);
        }
        Ok(encoded)
    }

    /// The sequence actually handed to the channel: the encoded copy twice
    pub fn frame(&self, message: &str) -> Result<Vec<Bit>> {
        let encoded = self.encode(message)?;
        Ok([encoded.as_slice(), encoded.as_slice()].concat())
    }

    /// Decode a received two-copy sequence back into text
    pub fn decode(&self, received: &[Bit]) -> Result<(String, DecodeStats, DecodeStats)> {
        let copy_len = received.len() / 2;
        if received.len() % 2 != 0 || copy_len % CODEWORD_BITS != 0 {
            anyhow::bail!(
                "Received {} bits, not two whole copies of {}-bit codewords",
                received.len(),
                CODEWORD_BITS
            );
        }

        let (copy_a, copy_b) = received.split_at(copy_len);
        let mut stats_a = DecodeStats::default();
        let mut stats_b = DecodeStats::default();
        let mut bits = Vec::with_capacity(copy_len / CODEWORD_BITS * DATA_BITS);

        for (index, (word_a, word_b)) in copy_a
            .chunks_exact(CODEWORD_BITS)
            .zip(copy_b.chunks_exact(CODEWORD_BITS))
            .enumerate()
        {
            let first = Decoded::from(self.codec.decode(word_a)?);
            let second = Decoded::from(self.codec.decode(word_b)?);
            stats_a.record(first.status);
            stats_b.record(second.status);

            if first.status == ErrorStatus::Uncorrectable || second.status == ErrorStatus::Uncorrectable {
                debug!(
                    "Block {}: copy A {:?}, copy B {:?}",
                    index, first.status, second.status
                );
            }

            bits.extend_from_slice(&combine(first, second));
        }

        if bits.len() >= BITS_PER_CHAR && bits[bits.len() - BITS_PER_CHAR..].iter().all(|&b| b == 0) {
            bits.truncate(bits.len() - BITS_PER_CHAR);
        }

        let message = unpack_message(&bits).context("Failed to unpack recovered bits")?;
        Ok((message, stats_a, stats_b))
    }

    /// Send `message` through `channel` and compare what comes out
    pub fn run(&self, message: &str, channel: &mut dyn Channel) -> Result<PipelineReport> {
        let frame = self.frame(message)?;
        let blocks = frame.len() / 2 / CODEWORD_BITS;
        debug!("Encoded {} characters into {} blocks per copy", message.chars().count(), blocks);

        let received = channel
            .transfer(&frame)
            .with_context(|| format!("Channel '{}' failed", channel.name()))?;
        if received.len() != frame.len() {
            anyhow::bail!(
                "Channel '{}' returned {} bits for {} sent",
                channel.name(),
                received.len(),
                frame.len()
            );
        }

        let (recovered, copy_a, copy_b) = self.decode(&received)?;
        let (errors, error_rate) = compare(message, &recovered);

        let original_len = message.chars().count();
        let recovered_len = recovered.chars().count();
        if original_len != recovered_len {
            warn!(
                "Recovered {} characters, expected {}",
                recovered_len, original_len
            );
        }

        info!(
            "{} channel: {} blocks, {} character errors, copy A {} corrected / {} uncorrectable, copy B {} corrected / {} uncorrectable",
            channel.name(),
            blocks,
            errors,
            copy_a.corrected_errors,
            copy_a.uncorrectable_blocks,
            copy_b.corrected_errors,
            copy_b.uncorrectable_blocks
        );

        Ok(PipelineReport {
            original: message.to_string(),
            recovered,
            errors,
            error_rate,
            blocks,
            copy_a,
            copy_b,
        })
    }
}

/// Count original positions that were not recovered and the resulting rate
fn compare(original: &str, recovered: &str) -> (usize, f64) {
    let recovered: Vec<char> = recovered.chars().collect();
    let errors = original
        .chars()
        .enumerate()
        .filter(|(i, ch)| recovered.get(*i) != Some(ch))
        .count();

    let rate = if recovered.is_empty() {
        if errors == 0 { 0.0 } else { 1.0 }
    } else {
        errors as f64 / recovered.len() as f64
    };
    (errors, rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamfec_modem::prelude::*;
    use quickcheck_macros::quickcheck;

    /// Flips the listed positions and nothing else
    struct FlipChannel {
        flips: Vec<usize>,
    }

    impl Channel for FlipChannel {
        fn transfer(&mut self, bits: &[Bit]) -> hamfec_modem::Result<Vec<Bit>> {
            let mut out = bits.to_vec();
            for &i in &self.flips {
                out[i] ^= 1;
            }
            Ok(out)
        }

        fn name(&self) -> &str {
            "flip"
        }
    }

    /// Drops the last bit
    struct LossyChannel;

    impl Channel for LossyChannel {
        fn transfer(&mut self, bits: &[Bit]) -> hamfec_modem::Result<Vec<Bit>> {
            Ok(bits[..bits.len().saturating_sub(1)].to_vec())
        }

        fn name(&self) -> &str {
            "lossy"
        }
    }

    fn run_with_flips(message: &str, flips: Vec<usize>) -> PipelineReport {
        Pipeline::new()
            .run(message, &mut FlipChannel { flips })
            .unwrap()
    }

    #[test]
    fn test_even_message_round_trip() {
        let report = Pipeline::new().run("HI", &mut IdealChannel).unwrap();
        assert_eq!(report.recovered, "HI");
        assert_eq!(report.errors, 0);
        assert_eq!(report.error_rate, 0.0);
        assert_eq!(report.blocks, 1);
        assert_eq!(report.copy_a.clean_blocks, 1);
        assert_eq!(report.copy_b.clean_blocks, 1);
    }

    #[test]
    fn test_odd_message_strips_sentinel() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.encode("A").unwrap().len(), CODEWORD_BITS);

        let report = pipeline.run("A", &mut IdealChannel).unwrap();
        assert_eq!(report.recovered, "A");
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_empty_message() {
        let report = Pipeline::new().run("", &mut IdealChannel).unwrap();
        assert_eq!(report.recovered, "");
        assert_eq!(report.errors, 0);
        assert_eq!(report.error_rate, 0.0);
        assert_eq!(report.blocks, 0);
    }

    #[test]
    fn test_frame_is_two_identical_copies() {
        let pipeline = Pipeline::new();
        let frame = pipeline.frame("HELLO").unwrap();
        assert_eq!(frame.len(), 2 * 3 * CODEWORD_BITS);

        let (a, b) = frame.split_at(frame.len() / 2);
        assert_eq!(a, b);
        assert_eq!(a, pipeline.encode("HELLO").unwrap().as_slice());
    }

    #[test]
    fn test_single_flip_in_either_copy_is_repaired() {
        for slot in 1..CODEWORD_BITS {
            let report = run_with_flips("HI", vec![slot]);
            assert_eq!(report.recovered, "HI");
            assert_eq!(report.copy_a.corrected_errors, 1);
            assert_eq!(report.copy_b.clean_blocks, 1);

            let report = run_with_flips("HI", vec![CODEWORD_BITS + slot]);
            assert_eq!(report.recovered, "HI");
            assert_eq!(report.copy_a.clean_blocks, 1);
            assert_eq!(report.copy_b.corrected_errors, 1);
        }
    }

    #[test]
    fn test_overall_parity_flip_leaves_copy_clean() {
        let report = run_with_flips("HI", vec![CODEWORD_BITS]);
        assert_eq!(report.recovered, "HI");
        assert_eq!(report.copy_b.clean_blocks, 1);
        assert_eq!(report.copy_b.corrected_errors, 0);
    }

    #[test]
    fn test_parity_only_flip_beats_miscorrected_copy() {
        // slots 1, 2 and 4 alias to a single error in data slot 7
        let report = run_with_flips("HI", vec![1, 2, 4, CODEWORD_BITS]);
        assert_eq!(report.copy_a.corrected_errors, 1);
        assert_eq!(report.copy_b.clean_blocks, 1);
        assert_eq!(report.recovered, "HI");
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_double_flip_in_one_copy_falls_back_to_other() {
        // data slots 3 and 5 of the second block in copy A
        let report = run_with_flips("ABCD", vec![CODEWORD_BITS + 3, CODEWORD_BITS + 5]);
        assert_eq!(report.recovered, "ABCD");
        assert_eq!(report.copy_a.uncorrectable_blocks, 1);
        assert_eq!(report.copy_b.uncorrectable_blocks, 0);
    }

    #[test]
    fn test_double_flip_in_both_copies_is_detected() {
        let report = run_with_flips("HI", vec![3, 5, CODEWORD_BITS + 3, CODEWORD_BITS + 5]);
        assert_eq!(report.copy_a.uncorrectable_blocks, 1);
        assert_eq!(report.copy_b.uncorrectable_blocks, 1);
        // both copies carry the same wrong data bits, which are kept
        assert_ne!(report.recovered, "HI");
        assert!(report.errors > 0);
    }

    #[test]
    fn test_blocks_are_independent() {
        // an uncorrectable first block does not disturb the second
        let report = run_with_flips("HIJK", vec![3, 5, 2 * CODEWORD_BITS + 3, 2 * CODEWORD_BITS + 5]);
        assert_eq!(report.recovered.chars().skip(2).collect::<String>(), "JK");
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn test_channel_length_mismatch_is_an_error() {
        let err = Pipeline::new().run("HI", &mut LossyChannel).unwrap_err();
        assert!(err.to_string().contains("lossy"));
    }

    #[test]
    fn test_out_of_range_character_is_an_error() {
        let err = Pipeline::new().run("Ω", &mut IdealChannel).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::OutOfRangeCharacter { ch: 'Ω' })
        ));
    }

    #[test]
    fn test_trailing_nul_is_indistinguishable_from_padding() {
        // an even-length message ending in NUL loses that NUL
        let report = Pipeline::new().run("A\0", &mut IdealChannel).unwrap();
        assert_eq!(report.recovered, "A");
        assert_eq!(report.errors, 1);
        assert_eq!(report.error_rate, 1.0);

        // with an odd length only the padding is stripped
        let report = Pipeline::new().run("AB\0", &mut IdealChannel).unwrap();
        assert_eq!(report.recovered, "AB\0");
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_coded_channel_without_noise() {
        let noise = AwgnSource::new(0.0, None).unwrap();
        let mut channel = CodedAwgnChannel::with_defaults(noise).unwrap();
        let message = "CQ CQ DE S56SPZ K";
        let report = Pipeline::new().run(message, &mut channel).unwrap();
        assert_eq!(report.recovered, message);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_heavy_noise_is_reported_not_raised() {
        let noise = AwgnSource::from_variance(6.0, Some(11)).unwrap();
        let mut channel = CodedAwgnChannel::with_defaults(noise).unwrap();
        let message = "The quick brown fox";
        let report = Pipeline::new().run(message, &mut channel).unwrap();

        assert_eq!(report.blocks, 10);
        assert_eq!(report.copy_a.total(), 10);
        assert!(report.errors <= message.len());
    }

    #[test]
    fn test_compare_counts_missing_positions() {
        assert_eq!(compare("HELLO", "HELLO"), (0, 0.0));
        assert_eq!(compare("HELLO", "JELLO"), (1, 0.2));
        assert_eq!(compare("HELLO", "HELL"), (1, 0.25));
        assert_eq!(compare("", ""), (0, 0.0));
        assert_eq!(compare("A", ""), (1, 1.0));
    }

    #[quickcheck]
    fn prop_ideal_channel_round_trips(codes: Vec<u8>) -> bool {
        let message: String = codes.into_iter().map(char::from).collect();
        if message.ends_with('\0') {
            return true;
        }
        let report = Pipeline::new().run(&message, &mut IdealChannel).unwrap();
        report.recovered == message && report.errors == 0
    }
}
