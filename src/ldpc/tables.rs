//! Fixed tables of the FT8 (174, 91) LDPC code.
//!
//! `GENERATOR` holds the 83 x 91 generator-matrix rows in packed
//! hexadecimal form and drives encoding. `CHECK_TO_VAR` lists, for each
//! of the 83 parity checks, the codeword bits it constrains; the
//! reverse adjacency is derived from it once at startup. Every variable
//! participates in exactly three checks.

use lazy_static::lazy_static;

use super::{CHECKS_PER_VAR, LDPC_M, LDPC_N};

/// Generator-matrix rows, 91 bits each packed as 23 hex digits.
pub(crate) const GENERATOR: [&str; LDPC_M] = [
    "8329ce11bf31eaf509f27fc",
    "761c264e25c259335493132",
    "dc265902fb277c6410a1bdc",
    "1b3f417858cd2dd33ec7f62",
    "09fda4fee04195fd034783a",
    "077cccc11b8873ed5c3d48a",
    "29b62afe3ca036f4fe1a9da",
    "6054faf5f35d96d3b0c8c3e",
    "e20798e4310eed27884ae90",
    "775c9c08e80e26ddae56318",
    "b0b811028c2bf997213487c",
    "18a0c9231fc60adf5c5ea32",
    "76471e8302a0721e01b12b8",
    "ffbccb80ca8341fafb47b2e",
    "66a72a158f9325a2bf67170",
    "c4243689fe85b1c51363a18",
    "0dff739414d1a1b34b1c270",
    "15b48830636c8b99894972e",
    "29a89c0d3de81d665489b0e",
    "4f126f37fa51cbe61bd6b94",
    "99c47239d0d97d3c84e0940",
    "1919b75119765621bb4f1e8",
    "09db12d731faee0b86df6b8",
    "488fc33df43fbdeea4eafb4",
    "827423ee40b675f756eb5fe",
    "abe197c484cb74757144a9a",
    "2b500e4bc0ec5a6d2bdbdd0",
    "c474aa53d70218761669360",
    "8eba1a13db3390bd6718cec",
    "753844673a27782cc42012e",
    "06ff83a145c37035a5c1268",
    "3b37417858cc2dd33ec3f62",
    "9a4a5a28ee17ca9c324842c",
    "bc29f465309c977e89610a4",
    "2663ae6ddf8b5ce2bb29488",
    "46f231efe457034c1814418",
    "3fb2ce85abe9b0c72e06fbe",
    "de87481f282c153971a0a2e",
    "fcd7ccf23c69fa99bba1412",
    "f0261447e9490ca8e474cec",
    "4410115818196f95cdd7012",
    "088fc31df4bfbde2a4eafb4",
    "b8fef1b6307729fb0a078c0",
    "5afea7acccb77bbc9d99a90",
    "49a7016ac653f65ecdc9076",
    "1944d085be4e7da8d6cc7d0",
    "251f62adc4032f0ee714002",
    "56471f8702a0721e00b12b8",
    "2b8e4923f2dd51e2d537fa0",
    "6b550a40a66f4755de95c26",
    "a18ad28d4e27fe92a4f6c84",
    "10c2e586388cb82a3d80758",
    "ef34a41817ee02133db2eb0",
    "7e9c0c54325a9c15836e000",
    "3693e572d1fde4cdf079e86",
    "bfb2cec5abe1b0c72e07fbe",
    "7ee18230c583cccc57d4b08",
    "a066cb2fedafc9f52664126",
    "bb23725abc47cc5f4cc4cd2",
    "ded9dba3bee40c59b5609b4",
    "d9a7016ac653e6decdc9036",
    "9ad46aed5f707f280ab5fc4",
    "e5921c77822587316d7d3c2",
    "4f14da8242a8b86dca73352",
    "8b8b507ad467d4441df770e",
    "22831c9cf1169467ad04b68",
    "213b838fe2ae54c38ee7180",
    "5d926b6dd71f085181a4e12",
    "66ab79d4b29ee6e69509e56",
    "958148682d748a38dd68baa",
    "b8ce020cf069c32a723ab14",
    "f4331d6d461607e95752746",
    "6da23ba424b9596133cf9c8",
    "a636bcbc7b30c5fbeae67fe",
    "5cb0d86a07df654a9089a20",
    "f11f106848780fc9ecdd80a",
    "1fbb5364fb8d2c9d730d5ba",
    "fcb86bc70a50c9d02a5d034",
    "a534433029eac15f322e34c",
    "c989d9c7c3d3b8c55d75130",
    "7bb38b2f0186d46643ae962",
    "2644ebadeb44b9467d1f42c",
    "608cc857594bfbb55d69600",
];

/// Codeword bits constrained by each parity check (0-based).
pub(crate) const CHECK_TO_VAR: [&[usize]; LDPC_M] = [
    &[3, 30, 58, 90, 91, 95, 152],
    &[4, 31, 59, 92, 114, 145],
    &[5, 23, 60, 93, 121, 150],
    &[6, 32, 61, 94, 95, 142],
    &[7, 24, 62, 82, 92, 95, 147],
    &[5, 31, 63, 96, 125, 137],
    &[4, 33, 64, 77, 97, 106, 153],
    &[8, 34, 65, 98, 138, 145],
    &[9, 35, 66, 99, 106, 125],
    &[10, 36, 66, 86, 100, 138, 157],
    &[11, 37, 67, 101, 104, 154],
    &[12, 38, 68, 102, 148, 161],
    &[7, 39, 69, 81, 103, 113, 144],
    &[13, 40, 70, 87, 101, 122, 155],
    &[14, 41, 58, 105, 122, 158],
    &[0, 32, 71, 105, 106, 156],
    &[15, 42, 72, 107, 140, 159],
    &[16, 36, 73, 80, 108, 130, 153],
    &[10, 43, 74, 109, 120, 165],
    &[44, 54, 63, 110, 129, 160, 172],
    &[7, 45, 70, 111, 118, 165],
    &[17, 35, 75, 88, 112, 113, 142],
    &[18, 37, 76, 103, 115, 162],
    &[19, 46, 69, 91, 137, 164],
    &[1, 47, 73, 112, 127, 159],
    &[20, 44, 77, 82, 116, 120, 150],
    &[21, 46, 57, 117, 126, 163],
    &[15, 38, 61, 111, 133, 157],
    &[22, 42, 78, 119, 130, 144],
    &[18, 34, 58, 72, 109, 124, 160],
    &[19, 35, 62, 93, 135, 160],
    &[13, 30, 78, 97, 131, 163],
    &[2, 43, 79, 123, 126, 168],
    &[18, 45, 80, 116, 134, 166],
    &[6, 48, 57, 89, 99, 104, 167],
    &[11, 49, 60, 117, 118, 143],
    &[12, 50, 63, 113, 117, 156],
    &[23, 51, 75, 128, 147, 148],
    &[24, 52, 68, 89, 100, 129, 155],
    &[19, 45, 64, 79, 119, 139, 169],
    &[20, 53, 76, 99, 139, 170],
    &[34, 81, 132, 141, 170, 173],
    &[13, 29, 82, 112, 124, 169],
    &[3, 28, 67, 119, 133, 172],
    &[0, 3, 51, 56, 85, 135, 151],
    &[25, 50, 55, 90, 121, 136, 167],
    &[51, 83, 109, 114, 144, 167],
    &[6, 49, 80, 98, 131, 172],
    &[22, 54, 66, 94, 171, 173],
    &[25, 40, 76, 108, 140, 147],
    &[1, 26, 40, 60, 61, 114, 132],
    &[26, 39, 55, 123, 124, 125],
    &[17, 48, 54, 123, 140, 166],
    &[5, 32, 84, 107, 115, 155],
    &[27, 47, 69, 84, 104, 128, 157],
    &[8, 53, 62, 130, 146, 154],
    &[21, 52, 67, 108, 120, 173],
    &[2, 12, 47, 77, 94, 122],
    &[30, 68, 132, 149, 154, 168],
    &[11, 42, 65, 88, 96, 134, 158],
    &[4, 38, 74, 101, 135, 166],
    &[1, 53, 85, 100, 134, 163],
    &[14, 55, 86, 107, 118, 170],
    &[9, 43, 81, 90, 110, 143, 148],
    &[22, 33, 70, 93, 126, 152],
    &[10, 48, 87, 91, 141, 156],
    &[28, 33, 86, 96, 146, 161],
    &[29, 49, 59, 85, 136, 141, 161],
    &[9, 52, 65, 83, 111, 127, 164],
    &[21, 56, 84, 92, 139, 158],
    &[27, 31, 71, 102, 131, 165],
    &[27, 28, 83, 87, 116, 142, 149],
    &[0, 25, 44, 79, 127, 146],
    &[16, 26, 88, 102, 115, 152],
    &[50, 56, 97, 162, 164, 171],
    &[20, 36, 72, 137, 151, 168],
    &[15, 46, 75, 129, 136, 153],
    &[2, 23, 29, 71, 103, 138],
    &[8, 39, 89, 105, 133, 150],
    &[14, 57, 59, 73, 110, 149, 162],
    &[17, 41, 78, 143, 145, 151],
    &[24, 37, 64, 98, 121, 159],
    &[16, 41, 74, 128, 169, 171],
];

lazy_static! {
    /// Checks attached to each codeword bit, derived from `CHECK_TO_VAR`.
    pub(crate) static ref VAR_TO_CHECK: [[usize; CHECKS_PER_VAR]; LDPC_N] = {
        let mut adj = [[0usize; CHECKS_PER_VAR]; LDPC_N];
        let mut fill = [0usize; LDPC_N];
        for (check, vars) in CHECK_TO_VAR.iter().enumerate() {
            for &v in vars.iter() {
                adj[v][fill[v]] = check;
                fill[v] += 1;
            }
        }
        assert!(fill.iter().all(|&count| count == CHECKS_PER_VAR));
        adj
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_table_shape() {
        let total: usize = CHECK_TO_VAR.iter().map(|row| row.len()).sum();
        assert_eq!(total, LDPC_N * CHECKS_PER_VAR);

        let weight7 = CHECK_TO_VAR.iter().filter(|row| row.len() == 7).count();
        assert_eq!(weight7, 24);
        assert!(CHECK_TO_VAR.iter().all(|row| row.len() == 6 || row.len() == 7));
        assert!(CHECK_TO_VAR
            .iter()
            .all(|row| row.iter().all(|&v| v < LDPC_N)));
    }

    #[test]
    fn adjacency_is_consistent() {
        for (v, checks) in VAR_TO_CHECK.iter().enumerate() {
            for &c in checks {
                assert!(CHECK_TO_VAR[c].contains(&v));
            }
        }
    }
}
