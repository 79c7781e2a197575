//! Fine synchronization search.
//!
//! Refines a candidate's frequency and timing on the downmixed
//! baseband. For every offset pair the 21 sync symbols are demodulated
//! with Kaiser-windowed single-bin DFTs at the expected tone and one
//! tone below and above; the side tones form a data-adaptive noise
//! floor, which keeps the score ratio stable under AGC-like level
//! changes.

use rustfft::num_complex::Complex32;

use crate::constants::{FT8_COSTAS, FT8_NUM_TONES, FT8_SYNC_POS, FT8_TONE_SPACING};
use crate::window;

use super::downmix::Baseband;

/// Half-width of the frequency search, Hz.
const FREQ_SPAN: f32 = 3.2;

/// Number of frequency grid points across the span.
const FREQ_POINTS: usize = 21;

/// Kaiser shape parameter for the symbol window.
const KAISER_BETA: f32 = 2.0;

/// Result of the fine search, relative to the coarse candidate.
#[derive(Debug, Clone, Copy)]
pub struct FineSync {
    /// Frequency correction, Hz.
    pub freq_offset: f32,
    /// Timing correction in baseband samples.
    pub pos_offset: i32,
    /// Signal-to-sidetone power ratio at the maximum.
    pub score: f32,
}

#[inline]
fn phasor(turns: f32) -> Complex32 {
    let angle = 2.0 * std::f32::consts::PI * turns;
    Complex32::new(angle.cos(), angle.sin())
}

/// Search (freq, time) offsets around `pos_start`, the nominal
/// baseband sample of the first sync symbol.
pub fn search_sync_fine(bb: &Baseband, pos_start: i32) -> FineSync {
    let n = bb.sym_size2;
    let fs2 = bb.fs2;
    let win = window::kaiser(n, KAISER_BETA);

    // Conjugate phasors for each tone, and one tone spacing up/down.
    let mut ctones = vec![vec![Complex32::new(0.0, 0.0); n]; FT8_NUM_TONES];
    for (tone, row) in ctones.iter_mut().enumerate() {
        let f = bb.f0_down + tone as f32 * FT8_TONE_SPACING;
        for (j, c) in row.iter_mut().enumerate() {
            *c = phasor(-(j as f32) * f / fs2);
        }
    }
    let ctweak_plus: Vec<Complex32> = (0..n)
        .map(|j| phasor(-(j as f32) * FT8_TONE_SPACING / fs2))
        .collect();
    let ctweak_minus: Vec<Complex32> = (0..n)
        .map(|j| phasor(j as f32 * FT8_TONE_SPACING / fs2))
        .collect();

    let half_sym = (n / 2) as i32;
    let mut best = FineSync {
        freq_offset: 0.0,
        pos_offset: 0,
        score: f32::MIN,
    };

    let mut demod = vec![Complex32::new(0.0, 0.0); n];

    for k in 0..FREQ_POINTS {
        let freq_offset = -FREQ_SPAN + k as f32 * (2.0 * FREQ_SPAN / (FREQ_POINTS - 1) as f32);
        let ctweak: Vec<Complex32> = (0..n)
            .map(|j| phasor(-(j as f32) * freq_offset / fs2))
            .collect();

        for pos_offset in -half_sym..=half_sym {
            let mut power_sig = 0.0f32;
            let mut power_nse = 1e-12f32;

            for &sync_start in &FT8_SYNC_POS {
                for (i, &sync_tone) in FT8_COSTAS.iter().enumerate() {
                    let pos1 = pos_start + pos_offset + (n * (sync_start + i)) as i32;
                    if pos1 < 0 || (pos1 as usize + n) >= bb.samples.len() {
                        continue;
                    }
                    let seg = &bb.samples[pos1 as usize..pos1 as usize + n];
                    let ctone = &ctones[sync_tone as usize];

                    for j in 0..n {
                        demod[j] = win[j] * seg[j] * ctone[j] * ctweak[j];
                    }
                    let z_sym: Complex32 = demod.iter().sum();
                    let z_plus: Complex32 =
                        demod.iter().zip(&ctweak_plus).map(|(d, c)| d * c).sum();
                    let z_minus: Complex32 =
                        demod.iter().zip(&ctweak_minus).map(|(d, c)| d * c).sum();

                    power_sig += z_sym.norm_sqr();
                    power_nse += (z_plus.norm_sqr() + z_minus.norm_sqr()) / 2.0;
                }
            }

            let score = power_sig / power_nse;
            if score > best.score {
                best = FineSync {
                    freq_offset,
                    pos_offset,
                    score,
                };
            }
        }
    }

    tracing::debug!(
        freq_offset = best.freq_offset,
        pos_offset = best.pos_offset,
        score = best.score,
        "fine sync"
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FT8_NUM_SYMBOLS;

    /// Synthesize a complex baseband frame directly: phase-continuous
    /// tones at `f0_down + tone * 6.25 + df` Hz, starting `delay`
    /// samples in.
    fn synthetic_baseband(df: f32, delay: usize) -> Baseband {
        let fs2 = 100.0;
        let n = 16usize;
        let tones = crate::sim::frame_tones(&bitvec::bitvec![u8, bitvec::order::Msb0; 0; 77]);

        let mut samples = vec![Complex32::new(0.0, 0.0); delay + FT8_NUM_SYMBOLS * n + 64];
        let mut phase = 0.0f32;
        let mut idx = delay;
        for &tone in tones.iter() {
            let freq = tone as f32 * FT8_TONE_SPACING + df;
            let dphi = 2.0 * std::f32::consts::PI * freq / fs2;
            for _ in 0..n {
                samples[idx] = Complex32::new(phase.cos(), phase.sin());
                phase += dphi;
                idx += 1;
            }
        }

        Baseband {
            samples,
            fs2,
            f0_down: 0.0,
            sym_size2: n,
        }
    }

    #[test]
    fn recovers_a_small_frequency_offset() {
        let bb = synthetic_baseband(0.5, 8);
        let fine = search_sync_fine(&bb, 8);
        // 0.32 Hz grid: the estimate can be off by at most half a step
        // plus estimation noise.
        assert!((fine.freq_offset - 0.5).abs() <= 0.32, "df = {}", fine.freq_offset);
        assert!(fine.pos_offset.abs() <= 1);
    }

    #[test]
    fn recovers_a_timing_offset() {
        let bb = synthetic_baseband(0.0, 13);
        // Nominal start is 8: the true start is 5 samples later.
        let fine = search_sync_fine(&bb, 8);
        assert_eq!(fine.pos_offset, 5);
        assert!(fine.freq_offset.abs() <= 0.32);
    }

    #[test]
    fn score_is_scale_invariant() {
        let bb = synthetic_baseband(0.0, 8);
        let louder = Baseband {
            samples: bb.samples.iter().map(|z| z * 40.0).collect(),
            fs2: bb.fs2,
            f0_down: bb.f0_down,
            sym_size2: bb.sym_size2,
        };
        let a = search_sync_fine(&bb, 8);
        let b = search_sync_fine(&louder, 8);
        assert_eq!(a.pos_offset, b.pos_offset);
        assert_eq!(a.freq_offset, b.freq_offset);
        assert!((a.score / b.score - 1.0).abs() < 1e-3);
    }
}
