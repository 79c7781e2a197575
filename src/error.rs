//! Crate-level error type.
//!
//! Only input failures are errors: a bad WAV file or a signal too short
//! to analyze aborts that input. Candidates that fail to decode are a
//! normal outcome and are reported as `None`, never through this type.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("failed to open WAV file '{path}': {source}"))]
    WavOpen { path: String, source: hound::Error },

    #[snafu(display("unsupported WAV format: {detail}"))]
    WavFormat { detail: String },

    #[snafu(display("failed to read WAV samples: {source}"))]
    WavRead { source: hound::Error },

    #[snafu(display("signal too short: {len} samples, need at least {need}"))]
    SignalTooShort { len: usize, need: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
