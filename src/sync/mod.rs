//! Signal synchronization: coarse Costas search on the waterfall,
//! narrow-band downmixing, and fine (freq, time) refinement on the
//! baseband.

pub mod coarse;
pub mod downmix;
pub mod fine;

pub use coarse::{search_sync_coarse, Candidate, ScoreMode};
pub use downmix::{downmix, Baseband};
pub use fine::{search_sync_fine, FineSync};
