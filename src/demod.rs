//! Symbol demodulation and soft-bit extraction.
//!
//! Produces the 8 x 79 per-symbol tone power matrix (dB, normalized to
//! a 0 dB column peak) and converts it into 174 channel-bit
//! log-likelihoods via the Gray-group max-log rule. Positive LLR means
//! the bit is more likely 1.

use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

use crate::constants::{FT8_DATA_POS, FT8_NUM_SYMBOLS, FT8_NUM_TONES};
use crate::sync::{Baseband, FineSync};
use crate::waterfall::{Waterfall, DB_EPS, DB_FLOOR};

/// Per-symbol tone magnitudes in dB, `[tone][symbol]`, each column
/// normalized so its strongest tone reads 0 dB.
pub type ToneMatrix = [[f32; FT8_NUM_SYMBOLS]; FT8_NUM_TONES];

/// Demodulate the baseband after fine sync.
///
/// Mixes the residual offset down to DC, slices the 79-symbol span
/// (zero-padding where it runs off either edge), and takes a boxcar
/// DFT per symbol, keeping the 8 tone bins.
pub fn tone_matrix_downsampled(bb: &Baseband, fine: &FineSync, pos_start: i32) -> ToneMatrix {
    let n = bb.sym_size2;
    let mix_freq = bb.f0_down + fine.freq_offset;
    let slice_pos = pos_start + fine.pos_offset;

    let dphi = -2.0 * std::f32::consts::PI * mix_freq / bb.fs2;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buf = vec![Complex32::new(0.0, 0.0); n];

    let mut a2db: ToneMatrix = [[0.0; FT8_NUM_SYMBOLS]; FT8_NUM_TONES];

    for k in 0..FT8_NUM_SYMBOLS {
        for (j, b) in buf.iter_mut().enumerate() {
            let idx = slice_pos as i64 + (n * k + j) as i64;
            *b = if idx >= 0 && (idx as usize) < bb.samples.len() {
                let phase = dphi * idx as f32;
                bb.samples[idx as usize] * Complex32::new(phase.cos(), phase.sin())
            } else {
                Complex32::new(0.0, 0.0)
            };
        }
        fft.process(&mut buf);
        for tone in 0..FT8_NUM_TONES {
            a2db[tone][k] = 20.0 * (buf[tone].norm() + DB_EPS).log10();
        }
    }

    normalize_columns(&mut a2db);
    a2db
}

/// Read the tone matrix straight from the waterfall, without the
/// downmix/fine-sync stages: one row per tone at `freq_osr` stride, one
/// column per symbol at `time_osr` stride. Columns outside the grid
/// read as the dB floor.
pub fn tone_matrix_direct(wf: &Waterfall, bin_f0: usize, pos_start: i64) -> ToneMatrix {
    let mut a2db: ToneMatrix = [[0.0; FT8_NUM_SYMBOLS]; FT8_NUM_TONES];

    for k in 0..FT8_NUM_SYMBOLS {
        let col = pos_start + (k * wf.time_osr()) as i64;
        for tone in 0..FT8_NUM_TONES {
            a2db[tone][k] = if col >= 0 && (col as usize) < wf.n_cols() {
                wf.db(bin_f0 + tone * wf.freq_osr(), col as usize)
            } else {
                DB_FLOOR
            };
        }
    }

    normalize_columns(&mut a2db);
    a2db
}

fn normalize_columns(a2db: &mut ToneMatrix) {
    for k in 0..FT8_NUM_SYMBOLS {
        let max = (0..FT8_NUM_TONES)
            .map(|t| a2db[t][k])
            .fold(f32::MIN, f32::max);
        for t in 0..FT8_NUM_TONES {
            a2db[t][k] -= max;
        }
    }
}

/// Max-log LLRs for the 174 channel bits.
///
/// Per the Gray mapping, bit 0 splits the tones into {5,6,4,7} vs
/// {0,1,3,2}, bit 1 into {3,2,4,7} vs {0,1,5,6}, bit 2 into {1,2,6,7}
/// vs {0,3,5,4}; each LLR is the difference of the group maxima,
/// scaled by `llr_scale`.
pub fn extract_llrs(a2db: &ToneMatrix, llr_scale: f32) -> [f32; 174] {
    const GROUPS: [([usize; 4], [usize; 4]); 3] = [
        ([5, 6, 4, 7], [0, 1, 3, 2]),
        ([3, 2, 4, 7], [0, 1, 5, 6]),
        ([1, 2, 6, 7], [0, 3, 5, 4]),
    ];

    let mut llr = [0.0f32; 174];
    let mut out = 0;

    for &base in &FT8_DATA_POS {
        for k in base..base + 29 {
            for (ones, zeros) in &GROUPS {
                let max_one = ones.iter().map(|&t| a2db[t][k]).fold(f32::MIN, f32::max);
                let max_zero = zeros.iter().map(|&t| a2db[t][k]).fold(f32::MIN, f32::max);
                llr[out] = (max_one - max_zero) * llr_scale;
                out += 1;
            }
        }
    }

    debug_assert_eq!(out, 174);
    llr
}
