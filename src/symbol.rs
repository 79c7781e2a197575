//! Codeword to channel-symbol mapping.
//!
//! A 174-bit codeword becomes 58 data tones via the Gray map, laid out
//! as S7 D29 S7 D29 S7 with the Costas pattern in the three sync slots.

use bitvec::prelude::*;

use crate::constants::{
    FT8_COSTAS, FT8_GRAY_MAP, FT8_NUM_DATA_SYMBOLS, FT8_NUM_SYMBOLS, FT8_SYNC_POS,
};

/// Inverse Gray map: transmitted tone back to its 3-bit group.
const GRAY_MAP_INV: [u8; 8] = [0, 1, 3, 2, 6, 4, 5, 7];

/// Map a 174-bit codeword to the 79-tone channel sequence.
pub fn map(codeword: &BitSlice<u8, Msb0>, tones: &mut [u8; FT8_NUM_SYMBOLS]) {
    assert_eq!(codeword.len(), 174, "codeword must be 174 bits");

    for &start in &FT8_SYNC_POS {
        tones[start..start + 7].copy_from_slice(&FT8_COSTAS);
    }

    let mut k = 7;
    for j in 0..FT8_NUM_DATA_SYMBOLS {
        // Jump over the middle Costas block between the data halves.
        if j == 29 {
            k += 7;
        }
        let i = 3 * j;
        let group =
            ((codeword[i] as u8) << 2) | ((codeword[i + 1] as u8) << 1) | codeword[i + 2] as u8;
        tones[k] = FT8_GRAY_MAP[group as usize];
        k += 1;
    }
}

/// Recover the 174-bit codeword from a hard-decided tone sequence,
/// skipping the sync symbols.
pub fn demap(tones: &[u8; FT8_NUM_SYMBOLS], codeword: &mut BitSlice<u8, Msb0>) {
    assert_eq!(codeword.len(), 174, "codeword must be 174 bits");

    let mut i = 0;
    for (k, &tone) in tones.iter().enumerate() {
        if FT8_SYNC_POS.iter().any(|&s| (s..s + 7).contains(&k)) {
            continue;
        }
        let group = GRAY_MAP_INV[tone as usize];
        codeword.set(i, group & 0b100 != 0);
        codeword.set(i + 1, group & 0b010 != 0);
        codeword.set(i + 2, group & 0b001 != 0);
        i += 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_maps_invert_each_other() {
        for group in 0..8usize {
            assert_eq!(GRAY_MAP_INV[FT8_GRAY_MAP[group] as usize] as usize, group);
        }
    }

    #[test]
    fn sync_slots_carry_the_costas_pattern() {
        let codeword = bitvec![u8, Msb0; 0; 174];
        let mut tones = [0u8; FT8_NUM_SYMBOLS];
        map(&codeword, &mut tones);

        for &start in &FT8_SYNC_POS {
            assert_eq!(&tones[start..start + 7], &FT8_COSTAS);
        }
        // All-zero bits map to tone 0 in every data slot.
        assert!(tones[7..36].iter().all(|&t| t == 0));
        assert!(tones[43..72].iter().all(|&t| t == 0));
    }

    #[test]
    fn map_demap_roundtrip() {
        let mut codeword = bitvec![u8, Msb0; 0; 174];
        for i in (0..174).step_by(5) {
            codeword.set(i, true);
        }
        codeword.set(173, true);

        let mut tones = [0u8; FT8_NUM_SYMBOLS];
        map(&codeword, &mut tones);

        let mut recovered = bitvec![u8, Msb0; 0; 174];
        demap(&tones, &mut recovered);
        assert_eq!(recovered, codeword);
    }
}
