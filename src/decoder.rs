//! Decode pipeline orchestration.
//!
//! Runs candidates through downmix, fine sync, demodulation, LDPC
//! belief propagation and the CRC gate. Candidates are independent;
//! batch decoding fans them out with rayon and restores candidate
//! order afterwards so results are deterministic.

use bitvec::prelude::*;
use rayon::prelude::*;

use crate::constants::{
    FT8_CODEWORD_BITS, FT8_LDPC_PAYLOAD_BITS, FT8_PAYLOAD_BITS, FT8_SYMBOL_PERIOD,
};
use crate::crc::crc14_check;
use crate::demod::{extract_llrs, tone_matrix_direct, tone_matrix_downsampled};
use crate::ldpc::bp_decode;
use crate::sync::{downmix, search_sync_coarse, search_sync_fine, Candidate, ScoreMode};
use crate::waterfall::Waterfall;

/// Pipeline tunables. Defaults follow the reference operating point.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Minimum coarse sync score for a candidate.
    pub min_score: f32,
    /// Maximum number of candidates to decode.
    pub max_candidates: usize,
    /// Coarse scoring mode.
    pub score_mode: ScoreMode,
    /// Refine candidates on a downmixed baseband; otherwise demodulate
    /// straight off the waterfall grid.
    pub use_downsample: bool,
    /// Baseband sample rate for the downmix path, Hz.
    pub baseband_rate: f32,
    /// Scale applied to the demodulated LLRs before belief propagation.
    pub llr_scale: f32,
    /// Belief-propagation iteration cap.
    pub max_iterations: usize,
    /// Stop after this many iterations without changed hard decisions.
    pub max_no_improvement: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_score: 2.5,
            max_candidates: 30,
            score_mode: ScoreMode::NeighborContrast,
            use_downsample: true,
            baseband_rate: 100.0,
            llr_scale: 0.6,
            max_iterations: 30,
            max_no_improvement: 15,
        }
    }
}

/// An accepted frame: 174 hard bits partitioned as
/// [77 payload | 14 CRC | 83 parity], plus decode metadata.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub bits: BitVec<u8, Msb0>,
    /// Unsatisfied parity checks at termination (zero for accepted frames).
    pub num_errors: usize,
    /// Belief-propagation iterations run.
    pub iterations: usize,
    /// Frequency after fine refinement, Hz.
    pub f0_hz: f32,
    /// Frame start time after fine refinement, seconds.
    pub t0_s: f32,
}

impl DecodedFrame {
    pub fn payload(&self) -> &BitSlice<u8, Msb0> {
        &self.bits[..FT8_PAYLOAD_BITS]
    }

    pub fn crc_bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits[FT8_PAYLOAD_BITS..FT8_LDPC_PAYLOAD_BITS]
    }

    pub fn parity_bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits[FT8_LDPC_PAYLOAD_BITS..FT8_CODEWORD_BITS]
    }
}

/// Attempt to decode one candidate. Rejection (non-convergent BP or a
/// CRC mismatch) is a normal outcome and returns `None`.
pub fn decode_candidate(
    wf: &Waterfall,
    candidate: &Candidate,
    config: &DecoderConfig,
) -> Option<DecodedFrame> {
    let bin_f0 = (0.5 + candidate.f0_hz / wf.freq_step()) as usize;

    let (a2db, f0_hz, t0_s) = if config.use_downsample {
        let bb = downmix(wf, bin_f0, config.baseband_rate);
        let pos_start = (0.5 + candidate.t0_s * bb.fs2) as i32;
        let fine = search_sync_fine(&bb, pos_start);
        let a2db = tone_matrix_downsampled(&bb, &fine, pos_start);
        let f0_hz = bin_f0 as f32 * wf.freq_step() + fine.freq_offset;
        let t0_s = (pos_start + fine.pos_offset) as f32 / bb.fs2;
        (a2db, f0_hz, t0_s)
    } else {
        let pos_start =
            (0.5 + (candidate.t0_s + FT8_SYMBOL_PERIOD / 4.0) / wf.time_step()) as i64;
        let a2db = tone_matrix_direct(wf, bin_f0, pos_start);
        (a2db, bin_f0 as f32 * wf.freq_step(), candidate.t0_s)
    };

    let llr = extract_llrs(&a2db, config.llr_scale);
    let (bits, num_errors, iterations) =
        bp_decode(&llr, config.max_iterations, config.max_no_improvement);

    if num_errors != 0 {
        tracing::trace!(f0_hz, num_errors, "rejected: BP did not converge");
        return None;
    }
    if !crc14_check(&bits[..FT8_LDPC_PAYLOAD_BITS]) {
        tracing::trace!(f0_hz, "rejected: CRC mismatch");
        return None;
    }

    tracing::debug!(f0_hz, t0_s, iterations, "frame accepted");
    Some(DecodedFrame {
        bits,
        num_errors,
        iterations,
        f0_hz,
        t0_s,
    })
}

/// Search the waterfall and decode every candidate, dropping duplicate
/// frames (same payload within 10 Hz and 0.5 s). Output order follows
/// candidate rank, so repeated runs yield identical results.
pub fn decode_all(wf: &Waterfall, config: &DecoderConfig) -> Vec<DecodedFrame> {
    let candidates = search_sync_coarse(wf, config.min_score, config.max_candidates, config.score_mode);
    decode_candidates(wf, &candidates, config)
}

/// Decode an explicit candidate list (coarse search already done, or
/// the anchor supplied externally).
pub fn decode_candidates(
    wf: &Waterfall,
    candidates: &[Candidate],
    config: &DecoderConfig,
) -> Vec<DecodedFrame> {
    let mut decoded: Vec<(usize, DecodedFrame)> = candidates
        .par_iter()
        .enumerate()
        .filter_map(|(idx, cand)| decode_candidate(wf, cand, config).map(|f| (idx, f)))
        .collect();
    decoded.sort_by_key(|(idx, _)| *idx);

    let mut frames: Vec<DecodedFrame> = Vec::new();
    for (_, frame) in decoded {
        let duplicate = frames.iter().any(|kept| {
            kept.payload() == frame.payload()
                && (kept.f0_hz - frame.f0_hz).abs() < 10.0
                && (kept.t0_s - frame.t0_s).abs() < 0.5
        });
        if !duplicate {
            frames.push(frame);
        }
    }

    tracing::debug!(frames = frames.len(), "batch decode finished");
    frames
}
