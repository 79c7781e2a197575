//! Frame synthesis and channel impairments for tests and the CLI
//! noise-injection path.

use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::constants::{
    FT8_NUM_SYMBOLS, FT8_PAYLOAD_BITS, FT8_SYMBOL_PERIOD, FT8_TONE_SPACING,
};
use crate::crc::crc14;
use crate::ldpc;
use crate::symbol;

/// PRNG seed for reproducible noise injection.
pub const NOISE_SEED: u64 = 1337;

/// Build the 79-tone channel sequence for a 77-bit payload: checksum,
/// LDPC encode, Gray-map with Costas sync blocks.
pub fn frame_tones(payload: &BitSlice<u8, Msb0>) -> [u8; FT8_NUM_SYMBOLS] {
    assert_eq!(payload.len(), FT8_PAYLOAD_BITS, "payload must be 77 bits");

    let mut message = BitVec::<u8, Msb0>::with_capacity(91);
    message.extend_from_bitslice(payload);
    let crc = crc14(payload);
    for i in 0..14 {
        message.push((crc >> (13 - i)) & 1 != 0);
    }

    let mut codeword = bitvec![u8, Msb0; 0; 174];
    ldpc::encode(&message, &mut codeword);

    let mut tones = [0u8; FT8_NUM_SYMBOLS];
    symbol::map(&codeword, &mut tones);
    tones
}

/// Phase-continuous 8-FSK waveform for a tone sequence, unit amplitude.
pub fn synthesize(tones: &[u8], f0: f32, fs: f32) -> Vec<f32> {
    let sym_size = (fs * FT8_SYMBOL_PERIOD).round() as usize;
    let mut samples = Vec::with_capacity(tones.len() * sym_size);

    let mut phase = 0.0f32;
    for &tone in tones {
        let freq = f0 + tone as f32 * FT8_TONE_SPACING;
        let dphi = 2.0 * std::f32::consts::PI * freq / fs;
        for _ in 0..sym_size {
            samples.push(phase.sin());
            phase += dphi;
            if phase > 2.0 * std::f32::consts::PI {
                phase -= 2.0 * std::f32::consts::PI;
            }
        }
    }
    samples
}

/// Add a scaled waveform into a buffer, clipping at the buffer end.
pub fn mix_into(buffer: &mut [f32], wave: &[f32], start: usize, gain: f32) {
    for (i, &w) in wave.iter().enumerate() {
        let Some(slot) = buffer.get_mut(start + i) else {
            break;
        };
        *slot += gain * w;
    }
}

/// RMS level of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    let sum_sq: f32 = samples.iter().map(|&x| x * x).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Add white Gaussian noise with RMS `level_db` below the signal RMS.
/// Negative levels put the noise above the signal.
pub fn add_noise(samples: &mut [f32], level_db: f32, seed: u64) {
    let sigma = rms(samples) * 10f32.powf(-level_db / 20.0);
    if sigma <= 0.0 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, sigma).unwrap();
    for s in samples.iter_mut() {
        *s += normal.sample(&mut rng);
    }
}
