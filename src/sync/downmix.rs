//! Narrow-band downmixer.
//!
//! Extracts the 50 Hz channel of one candidate from the waterfall and
//! renders it as a complex baseband at `fs2` (default 100 Hz), with the
//! lowest tone near DC. The STFT strip is time-decimated to one column
//! per symbol, masked by a trapezoid row window, rolled so the signal
//! band starts at row 0, and inverse-transformed with Hann weighted
//! overlap-add.

use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

use crate::constants::{FT8_NUM_TONES, FT8_SYMBOL_PERIOD};
use crate::waterfall::Waterfall;
use crate::window;

/// Complex baseband around one candidate, scoped to a single decode.
pub struct Baseband {
    pub samples: Vec<Complex32>,
    /// Baseband sample rate, Hz.
    pub fs2: f32,
    /// Residual offset of the lowest tone from DC, Hz. Downstream
    /// stages treat it as a known constant.
    pub f0_down: f32,
    /// Samples per symbol at `fs2`.
    pub sym_size2: usize,
}

/// Downmix the channel whose lowest tone sits in waterfall row `bin_f0`.
pub fn downmix(wf: &Waterfall, bin_f0: usize, fs2: f32) -> Baseband {
    let freq_osr = wf.freq_osr();
    let time_osr = wf.time_osr();

    let sym_size2 = (fs2 * FT8_SYMBOL_PERIOD).round() as usize;
    let nfft2 = sym_size2 * freq_osr;
    let freq_step2 = fs2 / nfft2 as f32;

    let taper = 4usize;
    let pad = (nfft2 - 2 * taper - freq_osr * FT8_NUM_TONES) / 2;
    let shift = taper + pad;

    // Row mask: zero pad, linear ramp up, unity across the eight tone
    // rows, ramp down, zero pad.
    let mut mask = vec![0.0f32; nfft2];
    for i in 0..taper {
        mask[pad + i] = i as f32 / (taper - 1) as f32;
        mask[pad + taper + freq_osr * FT8_NUM_TONES + i] = (taper - 1 - i) as f32 / (taper - 1) as f32;
    }
    for m in mask.iter_mut().skip(pad + taper).take(freq_osr * FT8_NUM_TONES) {
        *m = 1.0;
    }

    let n_sym_cols = (wf.n_cols() + time_osr - 1) / time_osr;
    let hop = sym_size2;
    let out_len = hop * (n_sym_cols - 1) + nfft2;

    let win = window::hann(nfft2);
    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(nfft2);

    let mut acc = vec![Complex32::new(0.0, 0.0); out_len];
    let mut wsum = vec![0.0f32; out_len];
    let mut buf = vec![Complex32::new(0.0, 0.0); nfft2];

    for (m, col) in (0..wf.n_cols()).step_by(time_osr).enumerate() {
        // Masked strip, circularly rolled so the signal band is row 0.
        for (r, b) in buf.iter_mut().enumerate() {
            let src = (r + shift) % nfft2;
            let bin = bin_f0 as i64 - shift as i64 + src as i64;
            *b = if bin >= 0 && (bin as usize) < wf.n_bins() {
                wf.h(bin as usize, col) * mask[src]
            } else {
                Complex32::new(0.0, 0.0)
            };
        }
        ifft.process(&mut buf);

        let scale = 1.0 / nfft2 as f32;
        for n in 0..nfft2 {
            acc[m * hop + n] += win[n] * buf[n] * scale;
            wsum[m * hop + n] += win[n] * win[n];
        }
    }

    let samples = acc
        .iter()
        .zip(&wsum)
        .map(|(&a, &s)| if s > 1e-9 { a / s } else { Complex32::new(0.0, 0.0) })
        .collect();

    let f0_down = ((taper + pad) as isize - shift as isize) as f32 * freq_step2;

    Baseband {
        samples,
        fs2,
        f0_down,
        sym_size2,
    }
}
