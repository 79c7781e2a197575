//! Generator-matrix encoder.

use bitvec::prelude::*;

use super::tables::GENERATOR;
use super::{LDPC_K, LDPC_M, LDPC_N};

/// Read one bit of the generator matrix from its packed hex rows.
///
/// Row hex digits hold 4 bits MSB-first; the final digit carries only
/// 3 valid bits (91 = 22 * 4 + 3).
fn generator_bit(row: usize, col: usize) -> bool {
    debug_assert!(row < LDPC_M && col < LDPC_K);
    let hex = GENERATOR[row].as_bytes();
    let digit = match hex[col / 4] {
        c @ b'0'..=b'9' => c - b'0',
        c @ b'a'..=b'f' => c - b'a' + 10,
        c @ b'A'..=b'F' => c - b'A' + 10,
        _ => unreachable!("generator rows are hex"),
    };
    (digit >> (3 - col % 4)) & 1 != 0
}

/// Encode a 91-bit message into a 174-bit codeword.
///
/// The message occupies the first 91 codeword bits; the remaining 83
/// are parity, each the GF(2) dot product of a generator row with the
/// message.
pub fn encode(message: &BitSlice<u8, Msb0>, codeword: &mut BitSlice<u8, Msb0>) {
    assert_eq!(message.len(), LDPC_K, "message must be {} bits", LDPC_K);
    assert_eq!(codeword.len(), LDPC_N, "codeword must be {} bits", LDPC_N);

    codeword[..LDPC_K].copy_from_bitslice(message);

    for row in 0..LDPC_M {
        let mut parity = false;
        for col in 0..LDPC_K {
            parity ^= message[col] && generator_bit(row, col);
        }
        codeword.set(LDPC_K + row, parity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_message_encodes_to_zero() {
        let mut message_storage = [0u8; 12];
        let message = &message_storage.view_bits_mut::<Msb0>()[..91];
        let mut codeword_storage = [0u8; 22];
        let codeword = &mut codeword_storage.view_bits_mut::<Msb0>()[..174];

        encode(message, codeword);
        assert!(codeword.not_any());
    }

    #[test]
    fn single_bit_message_reads_out_a_generator_column() {
        let mut message_storage = [0u8; 12];
        let message = &mut message_storage.view_bits_mut::<Msb0>()[..91];
        message.set(0, true);

        let mut codeword_storage = [0u8; 22];
        let codeword = &mut codeword_storage.view_bits_mut::<Msb0>()[..174];
        encode(message, codeword);

        assert_eq!(&codeword[..91], &message[..]);
        for row in 0..83 {
            assert_eq!(codeword[91 + row], generator_bit(row, 0));
        }
    }

    #[test]
    fn known_message_vector() {
        // Message, checksum and parity cross-checked against WSJT-X
        // ft8code output.
        let payload = "00000000010111100101100110000000010100100110110011100110110001100111110010001";
        let crc = "00001001100101";
        let parity = "11100110011001101100100111100011101000010001100111111001100110001110011001011110010";

        let mut message_storage = [0u8; 12];
        let message = &mut message_storage.view_bits_mut::<Msb0>()[..91];
        for (i, c) in payload.chars().chain(crc.chars()).enumerate() {
            message.set(i, c == '1');
        }

        let mut codeword_storage = [0u8; 22];
        let codeword = &mut codeword_storage.view_bits_mut::<Msb0>()[..174];
        encode(message, codeword);

        for (i, c) in parity.chars().enumerate() {
            assert_eq!(codeword[91 + i], c == '1', "parity bit {i}");
        }
    }

    #[test]
    #[should_panic(expected = "message must be 91 bits")]
    fn wrong_message_length_panics() {
        let mut message_storage = [0u8; 12];
        let message = &message_storage.view_bits::<Msb0>()[..77];
        let mut codeword_storage = [0u8; 22];
        let codeword = &mut codeword_storage.view_bits_mut::<Msb0>()[..174];
        encode(message, codeword);
    }
}
