//! Belief-propagation decoder.

use bitvec::prelude::*;

use super::tables::{CHECK_TO_VAR, VAR_TO_CHECK};
use super::{CHECKS_PER_VAR, LDPC_M, LDPC_N, MAX_VARS_PER_CHECK};

/// Piecewise-linear atanh approximation used for the check-to-variable
/// update. Capped at +/-7.0, which keeps strongly decided bits from
/// saturating the message arithmetic.
#[inline]
fn platanh(x: f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs();

    if z <= 0.664 {
        x / 0.83
    } else if z <= 0.9217 {
        sign * (z - 0.4064) / 0.322
    } else if z <= 0.9951 {
        sign * (z - 0.8378) / 0.0524
    } else if z <= 0.9998 {
        sign * (z - 0.9914) / 0.0012
    } else {
        sign * 7.0
    }
}

/// Count parity checks unsatisfied by the hard decisions `cw`.
fn count_errors(cw: &BitSlice<u8, Msb0>) -> usize {
    CHECK_TO_VAR
        .iter()
        .filter(|vars| {
            let mut parity = false;
            for &v in vars.iter() {
                parity ^= cw[v];
            }
            parity
        })
        .count()
}

/// Decode 174 bit log-likelihoods by belief propagation.
///
/// Positive LLR means the bit is more likely 1. Returns the hard
/// decisions, the number of parity checks they leave unsatisfied, and
/// the number of iterations run. The caller accepts the frame only when
/// the error count is zero and the CRC matches.
///
/// Terminates on the first of: all checks satisfied, `max_iters`
/// reached, or `max_no_improvement` consecutive iterations in which the
/// hard decisions did not change.
pub fn bp_decode(
    llr: &[f32],
    max_iters: usize,
    max_no_improvement: usize,
) -> (BitVec<u8, Msb0>, usize, usize) {
    assert_eq!(llr.len(), LDPC_N, "expected {} LLR values", LDPC_N);

    // Messages to checks, indexed [check][slot], and to variables,
    // indexed [var][slot].
    let mut toc = [[0.0f32; MAX_VARS_PER_CHECK]; LDPC_M];
    let mut tov = [[0.0f32; CHECKS_PER_VAR]; LDPC_N];
    let mut zn = [0.0f32; LDPC_N];

    for (check, vars) in CHECK_TO_VAR.iter().enumerate() {
        for (slot, &v) in vars.iter().enumerate() {
            toc[check][slot] = llr[v];
        }
    }

    let mut prev_cw = BitVec::<u8, Msb0>::repeat(false, LDPC_N);
    let mut stale = 0usize;

    for iter in 0..=max_iters {
        // Posterior estimate and hard decisions.
        for i in 0..LDPC_N {
            zn[i] = llr[i] + tov[i].iter().sum::<f32>();
        }
        let mut cw = BitVec::<u8, Msb0>::repeat(false, LDPC_N);
        for i in 0..LDPC_N {
            cw.set(i, zn[i] > 0.0);
        }

        let num_errors = count_errors(&cw);
        if num_errors == 0 || iter == max_iters {
            return (cw, num_errors, iter);
        }

        if iter > 0 && cw == prev_cw {
            stale += 1;
            if stale >= max_no_improvement {
                return (cw, num_errors, iter);
            }
        } else {
            stale = 0;
            prev_cw = cw;
        }

        // Variable-to-check messages: posterior minus what this check
        // contributed last round.
        for (check, vars) in CHECK_TO_VAR.iter().enumerate() {
            for (slot, &v) in vars.iter().enumerate() {
                let mut msg = zn[v];
                for k in 0..CHECKS_PER_VAR {
                    if VAR_TO_CHECK[v][k] == check {
                        msg -= tov[v][k];
                        break;
                    }
                }
                toc[check][slot] = msg;
            }
        }

        // Check-to-variable messages via the tanh product rule.
        for v in 0..LDPC_N {
            for k in 0..CHECKS_PER_VAR {
                let check = VAR_TO_CHECK[v][k];
                let mut product = 1.0f32;
                for (slot, &other) in CHECK_TO_VAR[check].iter().enumerate() {
                    if other != v {
                        product *= (-toc[check][slot] / 2.0).tanh();
                    }
                }
                tov[v][k] = 2.0 * platanh(-product);
            }
        }
    }

    unreachable!("loop returns at or before max_iters");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc::encode;

    fn known_codeword() -> BitVec<u8, Msb0> {
        let payload = "00000000010111100101100110000000010100100110110011100110110001100111110010001";
        let crc = "00001001100101";
        let mut message_storage = [0u8; 12];
        let message = &mut message_storage.view_bits_mut::<Msb0>()[..91];
        for (i, c) in payload.chars().chain(crc.chars()).enumerate() {
            message.set(i, c == '1');
        }
        let mut codeword = bitvec![u8, Msb0; 0; 174];
        encode(message, &mut codeword);
        codeword
    }

    fn llrs_for(cw: &BitSlice<u8, Msb0>, magnitude: f32) -> Vec<f32> {
        cw.iter()
            .map(|b| if *b { magnitude } else { -magnitude })
            .collect()
    }

    #[test]
    fn perfect_codeword_converges_immediately() {
        let cw = known_codeword();
        let llr = llrs_for(&cw, 10.0);

        let (bits, num_errors, iterations) = bp_decode(&llr, 30, 15);
        assert_eq!(num_errors, 0);
        assert_eq!(iterations, 0);
        assert_eq!(bits, cw);
    }

    #[test]
    fn corrects_flipped_parity_bits() {
        let cw = known_codeword();
        let mut llr = llrs_for(&cw, 4.0);
        llr[100] = -llr[100];
        llr[120] = -llr[120];

        let (bits, num_errors, iterations) = bp_decode(&llr, 30, 15);
        assert_eq!(num_errors, 0);
        assert!(iterations <= 30);
        assert_eq!(bits, cw);
    }

    #[test]
    fn frozen_contradiction_hits_the_stale_cutoff() {
        // Anchor every bit far beyond the +/-42 that three check
        // messages can contribute, with the variables of one parity
        // check all forced to 1: the odd parity can never be repaired
        // and the hard decisions never change.
        let mut llr = vec![-100.0f32; 174];
        for &v in [3usize, 30, 58, 90, 91, 95, 152].iter() {
            llr[v] = 100.0;
        }
        let (_bits, num_errors, iterations) = bp_decode(&llr, 30, 5);
        assert!(num_errors > 0);
        assert!(iterations < 30);
    }

    #[test]
    fn scale_does_not_change_a_clean_decode() {
        let cw = known_codeword();
        for scale in [0.6, 1.0, 2.0] {
            let llr = llrs_for(&cw, 4.0 * scale);
            let (bits, num_errors, _) = bp_decode(&llr, 30, 15);
            assert_eq!(num_errors, 0);
            assert_eq!(bits, cw);
        }
    }
}
