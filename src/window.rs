//! Window functions for STFT analysis and synthesis.
//!
//! The waterfall and the downmixer use periodic Hann windows; the fine
//! sync search uses a Kaiser window for its single-bin DFTs.

use std::f32::consts::PI;

/// Periodic Hann window: w[n] = 0.5 * (1 - cos(2*pi*n/N)).
pub fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos()))
        .collect()
}

/// Symmetric Kaiser window with shape parameter `beta`.
pub fn kaiser(n: usize, beta: f32) -> Vec<f32> {
    let denom = bessel_i0(beta);
    let half = (n - 1) as f32 / 2.0;
    (0..n)
        .map(|i| {
            let r = (i as f32 - half) / half;
            bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
        })
        .collect()
}

/// Zeroth-order modified Bessel function of the first kind, by power
/// series. Converges quickly for the small beta values used here.
fn bessel_i0(x: f32) -> f32 {
    let mut sum = 1.0f32;
    let mut term = 1.0f32;
    let half_x = x / 2.0;
    for k in 1..=25 {
        let factor = half_x / k as f32;
        term *= factor * factor;
        sum += term;
        if term < 1e-10 * sum {
            break;
        }
    }
    sum
}
