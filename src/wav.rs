//! WAV input loading.
//!
//! Accepts mono PCM recordings at any sample rate: 16-bit integer
//! samples are rescaled to [-1, 1], 32-bit float samples are taken
//! as-is.

use snafu::ResultExt;

use crate::error::{Result, WavFormatSnafu, WavOpenSnafu, WavReadSnafu};

/// Read a mono WAV file and return `(sample_rate, samples)`.
pub fn load_wav(path: &str) -> Result<(u32, Vec<f32>)> {
    let reader = hound::WavReader::open(path).context(WavOpenSnafu { path })?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return WavFormatSnafu {
            detail: format!("expected mono audio, got {} channels", spec.channels),
        }
        .fail();
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<Result<_, _>>()
                .context(WavReadSnafu)?,
            other => {
                return WavFormatSnafu {
                    detail: format!("unsupported bit depth: {other}"),
                }
                .fail()
            }
        },
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context(WavReadSnafu)?,
    };

    Ok((spec.sample_rate, samples))
}
