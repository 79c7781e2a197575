//! Coarse synchronization search.
//!
//! Scans the waterfall for the three Costas blocks over every sub-bin,
//! bin, sub-step and column offset, keeps local score maxima separated
//! by more than 2 bins and 2 columns, and reports the strongest as
//! candidates.

use std::collections::HashMap;

use crate::constants::{FT8_COSTAS, FT8_NUM_TONES, FT8_SYMBOL_PERIOD, FT8_SYNC_POS};
use crate::waterfall::Waterfall;

/// How a candidate position is scored against the sync pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// Ratio of power at the expected tone to the mean power of the
    /// other tones in the 50 Hz channel, in dB.
    InBandSnr,
    /// Mean dB contrast between the expected tone cell and its
    /// neighbors one bin below/above and one column earlier/later.
    NeighborContrast,
}

/// A potential frame anchor: lowest tone frequency, start time of the
/// first sync symbol, and sync score.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub f0_hz: f32,
    pub t0_s: f32,
    pub score: f32,
}

/// Search the waterfall for Costas sync anchors.
///
/// Only positions scoring above `min_score` are kept; at most
/// `max_cand` candidates are returned, strongest first. Column offsets
/// from -10 to +20 symbols are scanned, so frames may begin up to 1.6 s
/// before the recording.
pub fn search_sync_coarse(
    wf: &Waterfall,
    min_score: f32,
    max_cand: usize,
    mode: ScoreMode,
) -> Vec<Candidate> {
    let freq_osr = wf.freq_osr() as i64;
    let time_osr = wf.time_osr() as i64;
    let bin_min = wf.bin_min() as i64;
    let bin_max = wf.bin_max() as i64;

    let mut score_map: HashMap<(i64, i64), f32> = HashMap::new();

    for freq_sub in 0..freq_osr {
        let mut bin_first = bin_min + freq_sub;
        while bin_first < bin_max - FT8_NUM_TONES as i64 * freq_osr {
            for time_sub in 0..time_osr {
                for step in -10..21i64 {
                    let time_start = step * time_osr + time_sub;
                    let Some(score) = score_position(wf, bin_first, time_start, mode) else {
                        continue;
                    };
                    if score > min_score {
                        insert_local_max(&mut score_map, bin_first, time_start, score);
                    }
                }
            }
            bin_first += freq_osr;
        }
    }

    let mut ranked: Vec<((i64, i64), f32)> = score_map.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(max_cand);

    tracing::debug!(candidates = ranked.len(), "coarse sync finished");

    // A column indexes the start of the first sync symbol; the reported
    // time carries the quarter-symbol bias of the analysis window.
    let time_bias = FT8_SYMBOL_PERIOD / 4.0;
    ranked
        .into_iter()
        .map(|((bin, pos), score)| Candidate {
            f0_hz: bin as f32 * wf.freq_step(),
            t0_s: pos as f32 * wf.time_step() - time_bias,
            score,
        })
        .collect()
}

/// Score one (bin, column) anchor against the 21 sync symbols.
/// Returns `None` when no sync symbol falls inside the grid.
fn score_position(wf: &Waterfall, bin_first: i64, time_start: i64, mode: ScoreMode) -> Option<f32> {
    let freq_osr = wf.freq_osr() as i64;
    let time_osr = wf.time_osr() as i64;
    let bin_min = wf.bin_min() as i64;
    let bin_max = wf.bin_max() as i64;
    let n_cols = wf.n_cols() as i64;

    let mut snr_sig = 0.0f32;
    let mut snr_noise = 0.0f32;
    let mut contrast_sum = 0.0f32;
    let mut contrast_count = 0usize;

    for &sync_start in &FT8_SYNC_POS {
        for (i, &sync_tone) in FT8_COSTAS.iter().enumerate() {
            let pos = time_start + (sync_start + i) as i64 * time_osr;
            if pos < 0 || pos >= n_cols {
                continue;
            }
            let col = pos as usize;
            let tone = sync_tone as i64;
            let tone_bin = (bin_first + tone * freq_osr) as usize;

            match mode {
                ScoreMode::InBandSnr => {
                    snr_sig += wf.power(tone_bin, col);
                    for noise_tone in 0..7i64 {
                        if noise_tone != tone {
                            snr_noise +=
                                wf.power((bin_first + noise_tone * freq_osr) as usize, col);
                        }
                    }
                }
                ScoreMode::NeighborContrast => {
                    let sym_db = wf.db(tone_bin, col);
                    if bin_first + (tone - 1) * freq_osr >= bin_min {
                        contrast_sum +=
                            sym_db - wf.db((bin_first + (tone - 1) * freq_osr) as usize, col);
                        contrast_count += 1;
                    }
                    if bin_first + (tone + 1) * freq_osr < bin_max {
                        contrast_sum +=
                            sym_db - wf.db((bin_first + (tone + 1) * freq_osr) as usize, col);
                        contrast_count += 1;
                    }
                    if pos - 1 >= 0 {
                        contrast_sum += sym_db - wf.db(tone_bin, col - 1);
                        contrast_count += 1;
                    }
                    if pos + 1 < n_cols {
                        contrast_sum += sym_db - wf.db(tone_bin, col + 1);
                        contrast_count += 1;
                    }
                }
            }
        }
    }

    match mode {
        ScoreMode::InBandSnr => {
            if snr_sig > 0.0 && snr_noise > 0.0 {
                Some(10.0 * (snr_sig / (snr_noise / 6.0)).log10())
            } else {
                None
            }
        }
        ScoreMode::NeighborContrast => {
            if contrast_count > 0 {
                Some(contrast_sum / contrast_count as f32)
            } else {
                None
            }
        }
    }
}

/// Keep `score_map` a set of local maxima: drop the new entry if any
/// key in its 5x5 neighborhood is at least as strong, and evict every
/// strictly weaker neighbor.
fn insert_local_max(score_map: &mut HashMap<(i64, i64), f32>, bin: i64, pos: i64, score: f32) {
    let mut is_better = true;
    for delta_bin in -2..=2i64 {
        for delta_pos in -2..=2i64 {
            let key = (bin + delta_bin, pos + delta_pos);
            if let Some(&existing) = score_map.get(&key) {
                if existing <= score {
                    score_map.remove(&key);
                } else {
                    is_better = false;
                }
            }
        }
    }
    if is_better {
        score_map.insert((bin, pos), score);
    }
}
