//! Convolutional inner code with a soft-decision Viterbi decoder
//!
//! The encoder register holds the newest input bit in its most significant
//! position followed by the `K - 1` previous bits. A generator written as a
//! binary string (`"11110111"`) therefore lists its taps newest-first.

use crate::{FrameError, Result};
use hamfec_core::bits::Bit;

/// Rate 1/n convolutional code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvolutionalCode {
    constraint_length: usize,
    polynomials: Vec<u32>,
}

impl ConvolutionalCode {
    /// Create a new convolutional code
    pub fn new(constraint_length: usize, polynomials: Vec<u32>) -> Result<Self> {
        if !(2..=16).contains(&constraint_length) {
            return Err(FrameError::InvalidCodeParameters {
                msg: format!("Invalid constraint length: {}", constraint_length),
            });
        }

        if polynomials.is_empty() {
            return Err(FrameError::InvalidCodeParameters {
                msg: "At least one generator polynomial required".to_string(),
            });
        }

        let limit = 1u32 << constraint_length;
        if let Some(&poly) = polynomials.iter().find(|&&p| p == 0 || p >= limit) {
            return Err(FrameError::InvalidCodeParameters {
                msg: format!(
                    "Generator {:#b} does not fit constraint length {}",
                    poly, constraint_length
                ),
            });
        }

        Ok(Self {
            constraint_length,
            polynomials,
        })
    }

    /// Build a code from generator tap strings such as `"11110111"`.
    ///
    /// All strings must have the same length, which becomes the constraint
    /// length.
    pub fn from_binary_strings<S: AsRef<str>>(generators: &[S]) -> Result<Self> {
        let constraint_length = generators
            .first()
            .map(|g| g.as_ref().len())
            .ok_or_else(|| FrameError::InvalidCodeParameters {
                msg: "At least one generator polynomial required".to_string(),
            })?;

        let mut polynomials = Vec::with_capacity(generators.len());
        for generator in generators {
            let taps = generator.as_ref();
            if taps.len() != constraint_length {
                return Err(FrameError::InvalidCodeParameters {
                    msg: format!(
                        "Generator {:?} has {} taps, expected {}",
                        taps,
                        taps.len(),
                        constraint_length
                    ),
                });
            }

            let poly = u32::from_str_radix(taps, 2).map_err(|_| FrameError::InvalidCodeParameters {
                msg: format!("Generator {:?} is not a binary string", taps),
            })?;
            polynomials.push(poly);
        }

        Self::new(constraint_length, polynomials)
    }

    /// Rate 1/3, K=8 code with generators 11110111, 11011001, 10010101
    pub fn rate_1_3_k8() -> Self {
        Self {
            constraint_length: 8,
            polynomials: vec![0b1111_0111, 0b1101_1001, 0b1001_0101],
        }
    }

    pub fn constraint_length(&self) -> usize {
        self.constraint_length
    }

    pub fn polynomials(&self) -> &[u32] {
        &self.polynomials
    }

    /// Coded bits produced per input bit
    pub fn outputs(&self) -> usize {
        self.polynomials.len()
    }

    /// Get the code rate (k/n)
    pub fn code_rate(&self) -> f64 {
        1.0 / self.polynomials.len() as f64
    }

    /// Number of trellis states, 2^(K-1)
    pub fn num_states(&self) -> usize {
        1 << (self.constraint_length - 1)
    }

    fn state_mask(&self) -> u32 {
        (1u32 << (self.constraint_length - 1)) - 1
    }

    /// Shift one bit in. Returns the next state and the coded bits packed
    /// with polynomial `i` in bit `i`.
    fn step(&self, state: u32, input: Bit) -> (u32, u32) {
        let register = (u32::from(input & 1) << (self.constraint_length - 1)) | state;

        let mut packed = 0u32;
        for (i, &poly) in self.polynomials.iter().enumerate() {
            packed |= ((register & poly).count_ones() & 1) << i;
        }

        (register >> 1, packed)
    }

    /// Encode `bits` starting from `initial_state`.
    ///
    /// No tail is appended; callers that need the decoder to settle on the
    /// last data bit flush with zeros themselves. Returns the coded bits and
    /// the final register state.
    pub fn encode(&self, bits: &[Bit], initial_state: u32) -> (Vec<Bit>, u32) {
        let n = self.outputs();
        let mut encoded = Vec::with_capacity(bits.len() * n);
        let mut state = initial_state & self.state_mask();

        for &bit in bits {
            let (next, packed) = self.step(state, bit);
            for i in 0..n {
                encoded.push(((packed >> i) & 1) as Bit);
            }
            state = next;
        }

        (encoded, state)
    }
}

/// Longest traceback window a decoder accepts
pub const MAX_DECISION_DEPTH: usize = 4096;

/// Soft-decision Viterbi decoder working on quantized levels.
///
/// Each received symbol is an integer level in `0..=2^q - 1`, where `0` is a
/// confident zero and `2^q - 1` a confident one. Bits are released with a
/// delay of `decision_depth - 1` trellis stages, so the output is that many
/// bits shorter than the number of stages.
#[derive(Debug, Clone)]
pub struct SoftViterbiDecoder {
    code: ConvolutionalCode,
    decision_depth: usize,
    quant_level: u32,
    /// next_states[state][input]
    next_states: Vec<[usize; 2]>,
    /// branch_outputs[state][input], packed like `ConvolutionalCode::step`
    branch_outputs: Vec<[u32; 2]>,
}

impl SoftViterbiDecoder {
    /// Create a decoder for `code`
    pub fn new(code: ConvolutionalCode, decision_depth: usize, quant_level: u32) -> Result<Self> {
        if !(1..=MAX_DECISION_DEPTH).contains(&decision_depth) {
            return Err(FrameError::InvalidCodeParameters {
                msg: format!(
                    "Decision depth {} outside 1..={}",
                    decision_depth, MAX_DECISION_DEPTH
                ),
            });
        }

        if !(1..=16).contains(&quant_level) {
            return Err(FrameError::InvalidCodeParameters {
                msg: format!("Invalid quantization resolution: {} bits", quant_level),
            });
        }

        let num_states = code.num_states();
        let mut next_states = Vec::with_capacity(num_states);
        let mut branch_outputs = Vec::with_capacity(num_states);
        for state in 0..num_states as u32 {
            let (next0, out0) = code.step(state, 0);
            let (next1, out1) = code.step(state, 1);
            next_states.push([next0 as usize, next1 as usize]);
            branch_outputs.push([out0, out1]);
        }

        Ok(Self {
            code,
            decision_depth,
            quant_level,
            next_states,
            branch_outputs,
        })
    }

    pub fn code(&self) -> &ConvolutionalCode {
        &self.code
    }

    pub fn decision_depth(&self) -> usize {
        self.decision_depth
    }

    /// Highest quantization level, `2^q - 1`
    pub fn max_level(&self) -> u32 {
        (1u32 << self.quant_level) - 1
    }

    fn branch_metric(&self, received: &[u32], packed: u32) -> u64 {
        let max = self.max_level();
        received
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let expected = if (packed >> i) & 1 == 1 { max } else { 0 };
                let diff = u64::from(level.min(max).abs_diff(expected));
                diff * diff
            })
            .sum()
    }

    /// Decode a stream of quantized levels, `n` per trellis stage
    pub fn decode(&self, levels: &[u32]) -> Result<Vec<Bit>> {
        let n = self.code.outputs();
        if levels.len() % n != 0 {
            return Err(FrameError::InvalidSoftInput {
                msg: format!("{} levels is not a multiple of {} outputs", levels.len(), n),
            });
        }

        let num_states = self.code.num_states();
        let depth = self.decision_depth;
        let steps = levels.len() / n;
        let newest_bit_shift = self.code.constraint_length() - 2;

        let mut metrics = vec![u64::MAX; num_states];
        metrics[0] = 0;
        // survivors[step % depth][state] = predecessor of `state` at `step`
        let mut survivors = vec![vec![0usize; num_states]; depth];
        let mut decoded = Vec::with_capacity(steps.saturating_sub(depth - 1));

        for (step, received) in levels.chunks_exact(n).enumerate() {
            let mut next_metrics = vec![u64::MAX; num_states];
            let predecessors = &mut survivors[step % depth];

            for state in 0..num_states {
                let metric = metrics[state];
                if metric == u64::MAX {
                    continue;
                }

                for input in 0..2 {
                    let next = self.next_states[state][input];
                    let candidate =
                        metric + self.branch_metric(received, self.branch_outputs[state][input]);
                    if candidate < next_metrics[next] {
                        next_metrics[next] = candidate;
                        predecessors[next] = state;
                    }
                }
            }

            // keep metrics bounded
            let (best_state, best_metric) = next_metrics
                .iter()
                .copied()
                .enumerate()
                .min_by_key(|&(_, m)| m)
                .unwrap_or((0, 0));
            for metric in next_metrics.iter_mut().filter(|m| **m != u64::MAX) {
                *metric -= best_metric;
            }
            metrics = next_metrics;

            if step + 1 >= depth {
                let target = step + 1 - depth;
                let mut state = best_state;
                for back in (target + 1..=step).rev() {
                    state = survivors[back % depth][state];
                }
                decoded.push(((state >> newest_bit_shift) & 1) as Bit);
            }
        }

        Ok(decoded)
    }
}
