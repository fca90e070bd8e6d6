//! CEA-608 byte pair extraction from `cc_data()` user data
//!
//! Sample layout:
//! ```text
//! [0]      process flags | cc_count (low 5 bits)
//! [1]      em_data (ignored)
//! [2..]    cc_count triplets: marker, cc_data_1, cc_data_2
//! ```
//! The marker holds `cc_valid` (bit 2) and `cc_type` (bits 0-1). Only valid
//! field-1 NTSC pairs (`cc_type == 0`) are kept.

use super::CcBytePair;

const CC_COUNT_MASK: u8 = 0x1F;
const CC_VALID: u8 = 0x04;
const CC_TYPE_MASK: u8 = 0x03;
/// Strips the odd-parity bit
const PARITY_MASK: u8 = 0x7F;
const FIRST_TRIPLET_OFFSET: usize = 2;
const TRIPLET_LEN: usize = 3;

/// Extract the valid CEA-608 byte pairs carried by one user data sample.
///
/// Never fails: truncated samples yield the triplets that are complete.
pub fn extract_cea608_data(data: &[u8]) -> Vec<CcBytePair> {
    let Some(&header) = data.first() else {
        return Vec::new();
    };
    let count = (header & CC_COUNT_MASK) as usize;
    let triplets = data.get(FIRST_TRIPLET_OFFSET..).unwrap_or(&[]);

    triplets
        .chunks_exact(TRIPLET_LEN)
        .take(count)
        .filter_map(|triplet| {
            let marker = triplet[0];
            let pair = CcBytePair::new(triplet[1] & PARITY_MASK, triplet[2] & PARITY_MASK);

            // Padding, regardless of the marker bits
            if pair.is_padding() {
                return None;
            }
            let valid = marker & CC_VALID != 0;
            let cc_type = marker & CC_TYPE_MASK;
            (valid && cc_type == 0).then_some(pair)
        })
        .collect()
}
