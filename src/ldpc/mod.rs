//! The FT8 (174, 91) LDPC code.
//!
//! Encoding multiplies the 91-bit message (77 payload + 14 CRC bits) by
//! the generator matrix in GF(2) to append 83 parity bits. Decoding
//! runs belief propagation over the sparse parity-check graph on soft
//! bit log-likelihoods.

mod decode;
mod encode;
mod tables;

pub use decode::bp_decode;
pub use encode::encode;

/// Codeword length.
pub const LDPC_N: usize = 174;

/// Message length (77 payload + 14 CRC bits).
pub const LDPC_K: usize = 91;

/// Number of parity checks.
pub const LDPC_M: usize = 83;

/// Checks attached to every codeword bit.
pub const CHECKS_PER_VAR: usize = 3;

/// Upper bound on bits per check (rows carry 6 or 7).
pub const MAX_VARS_PER_CHECK: usize = 7;
