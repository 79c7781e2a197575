//! FT8 receiver core.
//!
//! Takes a band-limited audio recording of a ~15-second FT8 window and
//! recovers the frames in it: waterfall STFT, coarse Costas sync
//! search, narrow-band downmix with fine sync refinement, 8-FSK
//! demodulation to soft bits, LDPC(174,91) belief propagation and a
//! CRC-14 gate. Accepted frames carry 77 payload bits; rendering them
//! as human-readable messages is a separate layer.

pub mod constants;
pub mod crc;
pub mod decoder;
pub mod demod;
pub mod error;
pub mod ldpc;
pub mod sim;
pub mod symbol;
pub mod sync;
pub mod tracing_init;
pub mod waterfall;
pub mod wav;
pub mod window;

pub use decoder::{decode_all, decode_candidate, decode_candidates, DecodedFrame, DecoderConfig};
pub use error::{Error, Result};
pub use sync::{search_sync_coarse, Candidate, ScoreMode};
pub use waterfall::{Waterfall, WaterfallConfig};
