//! Byte Mask Unit Tests.
//!
//! Verifies mask construction, convention flipping between the narrow bus
//! (1 = write) and the cache (1 = preserve), and the byte-merge rule.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use widebridge_core::common::{ByteMask, merge_bytes};

// ══════════════════════════════════════════════════════════
// 1. Construction and queries
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(4, 0xF)]
#[case(16, 0xFFFF)]
#[case(32, 0xFFFF_FFFF)]
#[case(64, u64::MAX)]
fn full_selects_low_bytes(#[case] width: usize, #[case] bits: u64) {
    let mask = ByteMask::full(width);
    assert_eq!(mask.bits(), bits);
    assert!(mask.is_full(width));
    assert_eq!(mask.count(), width as u32);
}

#[test]
fn empty_mask_is_empty() {
    assert!(ByteMask::EMPTY.is_empty());
    assert!(!ByteMask::EMPTY.is_full(16));
    assert_eq!(ByteMask::EMPTY.count(), 0);
}

#[test]
fn is_set_reports_individual_bytes() {
    let mask = ByteMask(0b1010);
    assert!(!mask.is_set(0));
    assert!(mask.is_set(1));
    assert!(!mask.is_set(2));
    assert!(mask.is_set(3));
    assert!(!mask.is_set(64), "bytes past the widest line are never set");
}

#[rstest]
#[case(0x3, 0, 0x3)]
#[case(0x3, 4, 0x30)]
#[case(0xF, 12, 0xF000)]
#[case(0xF, 64, 0)]
fn shifted_moves_to_lane(#[case] bits: u64, #[case] by: usize, #[case] expected: u64) {
    assert_eq!(ByteMask(bits).shifted(by).bits(), expected);
}

// ══════════════════════════════════════════════════════════
// 2. Convention flip
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0, 16, 0xFFFF)]
#[case(0xFFFF, 16, 0x0)]
#[case(0x00F0, 16, 0xFF0F)]
#[case(0b0101, 4, 0b1010)]
fn invert_flips_within_width(#[case] bits: u64, #[case] width: usize, #[case] expected: u64) {
    assert_eq!(ByteMask(bits).invert(width).bits(), expected);
}

#[test]
fn invert_clears_bits_above_width() {
    let inverted = ByteMask(0xFFFF_0000).invert(16);
    assert_eq!(inverted.bits(), 0xFFFF);
}

// ══════════════════════════════════════════════════════════
// 3. Merge rule
// ══════════════════════════════════════════════════════════

#[test]
fn merge_full_preserve_keeps_existing() {
    let existing = [1, 2, 3, 4];
    let incoming = [9, 9, 9, 9];
    assert_eq!(merge_bytes(&existing, &incoming, ByteMask::full(4)), vec![1, 2, 3, 4]);
}

#[test]
fn merge_empty_preserve_takes_incoming() {
    let existing = [1, 2, 3, 4];
    let incoming = [9, 8, 7, 6];
    assert_eq!(merge_bytes(&existing, &incoming, ByteMask::EMPTY), vec![9, 8, 7, 6]);
}

#[test]
fn merge_mixes_per_byte() {
    let existing = [0xAA; 8];
    let incoming = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    // Preserve bytes 0..4, take 4..8.
    let merged = merge_bytes(&existing, &incoming, ByteMask(0x0F));
    assert_eq!(merged, vec![0xAA, 0xAA, 0xAA, 0xAA, 0x55, 0x66, 0x77, 0x88]);
}

#[test]
fn merge_result_has_existing_length() {
    let existing = [1, 2];
    let incoming = [7, 7, 7, 7];
    assert_eq!(merge_bytes(&existing, &incoming, ByteMask::EMPTY), vec![7, 7]);
}

proptest! {
    #[test]
    fn double_inversion_is_identity(bits in any::<u64>(), width in 1usize..=64) {
        let mask = ByteMask(bits & ByteMask::full(width).bits());
        prop_assert_eq!(mask.invert(width).invert(width), mask);
    }

    #[test]
    fn inverted_masks_partition_the_line(bits in any::<u64>(), width in 1usize..=64) {
        let mask = ByteMask(bits).invert(width).invert(width);
        let other = mask.invert(width);
        prop_assert_eq!(mask.bits() & other.bits(), 0);
        prop_assert!(mask.union(other).is_full(width));
    }

    #[test]
    fn merge_takes_exactly_the_clear_bytes(
        existing in prop::collection::vec(any::<u8>(), 16),
        incoming in prop::collection::vec(any::<u8>(), 16),
        bits in 0u64..=0xFFFF,
    ) {
        let merged = merge_bytes(&existing, &incoming, ByteMask(bits));
        for i in 0..16 {
            let want = if (bits >> i) & 1 == 1 { existing[i] } else { incoming[i] };
            prop_assert_eq!(merged[i], want);
        }
    }
}
