//! Oversampled spectrogram of the input audio.
//!
//! One symbol period spans `time_osr` STFT columns and one tone spans
//! `freq_osr` frequency rows, so the Costas search can step in
//! sub-symbol and sub-tone increments. All four grids share the same
//! `(n_bins x n_cols)` shape and are immutable once built.

use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

use crate::constants::{DEFAULT_FREQ_MAX, DEFAULT_FREQ_MIN, FT8_SYMBOL_PERIOD, FT8_TONE_SPACING};
use crate::error::{Result, SignalTooShortSnafu};
use crate::window;

/// Amplitude epsilon added before taking logs; -240 dB floor.
pub const DB_EPS: f32 = 1e-12;

/// dB value of a zero-amplitude cell.
pub const DB_FLOOR: f32 = -240.0;

#[derive(Debug, Clone)]
pub struct WaterfallConfig {
    /// Frequency oversampling: rows per tone spacing.
    pub freq_osr: usize,
    /// Time oversampling: columns per symbol period.
    pub time_osr: usize,
    /// Lower edge of the candidate search band, Hz.
    pub freq_min: f32,
    /// Upper edge of the candidate search band, Hz.
    pub freq_max: f32,
    /// Quantize the complex grid to 0.5 dB / 256 phase divisions.
    /// Storage-oriented; the scoring grids are never quantized.
    pub quantize: bool,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            freq_osr: 2,
            time_osr: 2,
            freq_min: DEFAULT_FREQ_MIN,
            freq_max: DEFAULT_FREQ_MAX,
            quantize: false,
        }
    }
}

/// STFT grids of one receive window, plus the derived geometry.
pub struct Waterfall {
    h: Vec<Complex32>,
    mag: Vec<f32>,
    power: Vec<f32>,
    db: Vec<f32>,
    n_bins: usize,
    n_cols: usize,
    freq_osr: usize,
    time_osr: usize,
    freq_step: f32,
    time_step: f32,
    bin_min: usize,
    bin_max: usize,
    sym_size: usize,
}

impl Waterfall {
    /// Build the waterfall from real audio samples.
    ///
    /// Uses a periodic Hann window of `sym_size * freq_osr` samples
    /// hopping by `sym_size / time_osr`, with no boundary padding: the
    /// first column is the first full window.
    pub fn build(samples: &[f32], fs: f32, config: &WaterfallConfig) -> Result<Self> {
        assert!(config.freq_osr >= 1 && config.time_osr >= 1);

        let sym_size = (fs * FT8_SYMBOL_PERIOD).round() as usize;
        let nfft = sym_size * config.freq_osr;
        let hop = sym_size / config.time_osr;

        if samples.len() < nfft {
            return SignalTooShortSnafu {
                len: samples.len(),
                need: nfft,
            }
            .fail();
        }

        let n_cols = (samples.len() - nfft) / hop + 1;
        let n_bins = nfft / 2 + 1;

        let win = window::hann(nfft);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(nfft);

        let mut h = vec![Complex32::new(0.0, 0.0); n_bins * n_cols];
        let mut buf = vec![Complex32::new(0.0, 0.0); nfft];

        for col in 0..n_cols {
            let start = col * hop;
            for (i, b) in buf.iter_mut().enumerate() {
                *b = Complex32::new(win[i] * samples[start + i], 0.0);
            }
            fft.process(&mut buf);
            for bin in 0..n_bins {
                h[bin * n_cols + col] = buf[bin];
            }
        }

        let mag: Vec<f32> = h.iter().map(|z| z.norm()).collect();
        let power: Vec<f32> = mag.iter().map(|a| a * a).collect();
        let db: Vec<f32> = mag.iter().map(|a| 20.0 * (a + DB_EPS).log10()).collect();

        if config.quantize {
            quantize(&mut h);
        }

        let freq_step = FT8_TONE_SPACING / config.freq_osr as f32;
        let time_step = FT8_SYMBOL_PERIOD / config.time_osr as f32;
        let bin_min = (config.freq_min / freq_step) as usize;
        let bin_max = ((config.freq_max / freq_step) as usize + 1).min(n_bins);

        tracing::debug!(n_bins, n_cols, bin_min, bin_max, "waterfall built");

        Ok(Self {
            h,
            mag,
            power,
            db,
            n_bins,
            n_cols,
            freq_osr: config.freq_osr,
            time_osr: config.time_osr,
            freq_step,
            time_step,
            bin_min,
            bin_max,
            sym_size,
        })
    }

    #[inline]
    pub fn h(&self, bin: usize, col: usize) -> Complex32 {
        self.h[bin * self.n_cols + col]
    }

    #[inline]
    pub fn mag(&self, bin: usize, col: usize) -> f32 {
        self.mag[bin * self.n_cols + col]
    }

    #[inline]
    pub fn power(&self, bin: usize, col: usize) -> f32 {
        self.power[bin * self.n_cols + col]
    }

    #[inline]
    pub fn db(&self, bin: usize, col: usize) -> f32 {
        self.db[bin * self.n_cols + col]
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn freq_osr(&self) -> usize {
        self.freq_osr
    }

    pub fn time_osr(&self) -> usize {
        self.time_osr
    }

    /// Frequency spacing of one row, Hz.
    pub fn freq_step(&self) -> f32 {
        self.freq_step
    }

    /// Time spacing of one column, seconds.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn bin_min(&self) -> usize {
        self.bin_min
    }

    pub fn bin_max(&self) -> usize {
        self.bin_max
    }

    pub fn sym_size(&self) -> usize {
        self.sym_size
    }
}

/// Quantize a complex grid to 0.5 dB magnitude steps (ceiling) and 256
/// phase divisions around the unit circle.
fn quantize(h: &mut [Complex32]) {
    const MAG_DB_STEP: f32 = 0.5;
    const PHASE_DIVS: f32 = 256.0;
    const TWO_PI: f32 = 2.0 * std::f32::consts::PI;

    for z in h.iter_mut() {
        let mag_db = 20.0 * (z.norm() + DB_EPS).log10();
        let mag_db = MAG_DB_STEP * (mag_db / MAG_DB_STEP).ceil();
        let phase = z.arg();
        let phase = (0.5 + phase * PHASE_DIVS / TWO_PI).ceil() / PHASE_DIVS * TWO_PI;
        let mag = 10f32.powf(mag_db / 20.0);
        *z = Complex32::from_polar(mag, phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, fs: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / fs).sin())
            .collect()
    }

    #[test]
    fn grids_share_shape_and_db_matches_definition() {
        let samples = tone(1000.0, 12000.0, 12000);
        let wf = Waterfall::build(&samples, 12000.0, &WaterfallConfig::default()).unwrap();

        let cells = wf.n_bins() * wf.n_cols();
        assert_eq!(wf.h.len(), cells);
        assert_eq!(wf.mag.len(), cells);
        assert_eq!(wf.power.len(), cells);
        assert_eq!(wf.db.len(), cells);

        for bin in (0..wf.n_bins()).step_by(97) {
            for col in 0..wf.n_cols() {
                let a = wf.mag(bin, col);
                assert_eq!(wf.db(bin, col), 20.0 * (a + DB_EPS).log10());
                assert_eq!(wf.power(bin, col), a * a);
            }
        }
    }

    #[test]
    fn geometry_follows_the_oversampling_factors() {
        let samples = tone(1500.0, 12000.0, 4 * 12000);
        let wf = Waterfall::build(&samples, 12000.0, &WaterfallConfig::default()).unwrap();

        assert_eq!(wf.sym_size(), 1920);
        assert_eq!(wf.n_bins(), 1920 + 1);
        assert_eq!(wf.freq_step(), 3.125);
        assert_eq!(wf.time_step(), 0.08);
        assert_eq!(wf.bin_min(), 96);
        assert_eq!(wf.bin_max(), 961);
        // 48000 samples, 3840-sample window, 960-sample hop.
        assert_eq!(wf.n_cols(), (48000 - 3840) / 960 + 1);
    }

    #[test]
    fn tone_energy_lands_in_its_bin() {
        let samples = tone(1500.0, 12000.0, 2 * 12000);
        let wf = Waterfall::build(&samples, 12000.0, &WaterfallConfig::default()).unwrap();

        let mut best_bin = 0;
        let mut best = f32::MIN;
        for bin in wf.bin_min()..wf.bin_max() {
            let v = wf.db(bin, 0);
            if v > best {
                best = v;
                best_bin = bin;
            }
        }
        assert_eq!(best_bin, 480); // 1500 Hz / 3.125 Hz per row
    }

    #[test]
    fn too_short_signal_is_rejected() {
        let samples = vec![0.0f32; 100];
        assert!(Waterfall::build(&samples, 12000.0, &WaterfallConfig::default()).is_err());
    }

    #[test]
    fn quantization_touches_only_the_complex_grid() {
        let samples = tone(700.0, 12000.0, 12000);
        let plain = Waterfall::build(&samples, 12000.0, &WaterfallConfig::default()).unwrap();
        let quant = Waterfall::build(
            &samples,
            12000.0,
            &WaterfallConfig {
                quantize: true,
                ..WaterfallConfig::default()
            },
        )
        .unwrap();

        // Scoring grids identical; complex grid within half a dB step.
        assert_eq!(plain.db, quant.db);
        for (a, b) in plain.h.iter().zip(quant.h.iter()) {
            let da = 20.0 * (a.norm() + DB_EPS).log10();
            let db_ = 20.0 * (b.norm() + DB_EPS).log10();
            assert!((da - db_).abs() <= 0.5 + 1e-3);
        }
    }
}
