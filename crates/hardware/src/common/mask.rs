//! Byte masks and the byte-merge rule.
//!
//! Two mask conventions meet in this model:
//! 1. **Write convention:** On the narrow bus a set bit means "write this byte".
//! 2. **Preserve convention:** On the cache and DRAM side a set bit means "keep the
//!    byte already stored, do not overwrite".
//!
//! The bridge converts between them with [`ByteMask::invert`]. Every write path
//! below the bridge merges with [`merge_bytes`] in preserve convention.

use super::constants::MAX_LINE_BYTES;

/// One bit per byte of a line (bit `i` covers byte `i`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByteMask(pub u64);

impl ByteMask {
    /// The mask with no bytes selected.
    pub const EMPTY: Self = Self(0);

    /// Returns a mask selecting the low `width` bytes.
    #[inline]
    pub const fn full(width: usize) -> Self {
        if width >= MAX_LINE_BYTES {
            Self(u64::MAX)
        } else {
            Self((1u64 << width) - 1)
        }
    }

    /// Returns the raw bitmap.
    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if byte `byte` is selected.
    #[inline]
    pub const fn is_set(self, byte: usize) -> bool {
        byte < MAX_LINE_BYTES && (self.0 >> byte) & 1 == 1
    }

    /// Returns `true` if no byte is selected.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every byte of a `width`-byte line is selected.
    #[inline]
    pub const fn is_full(self, width: usize) -> bool {
        self.0 & Self::full(width).0 == Self::full(width).0
    }

    /// Number of selected bytes.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Flips the convention of a `width`-byte mask (write <-> preserve).
    ///
    /// Bits above `width` are always cleared, so inverting twice returns the
    /// original mask restricted to the line.
    #[inline]
    pub const fn invert(self, width: usize) -> Self {
        Self(!self.0 & Self::full(width).0)
    }

    /// Bytes selected in either mask.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Moves the mask up by `bytes` byte positions (used for lane placement).
    #[inline]
    pub const fn shifted(self, bytes: usize) -> Self {
        if bytes >= MAX_LINE_BYTES {
            Self::EMPTY
        } else {
            Self(self.0 << bytes)
        }
    }
}

/// Merges `incoming` over `existing` byte by byte.
///
/// A set bit in `preserve` keeps the existing byte; a clear bit takes the
/// incoming byte. This one rule covers write hits, partial write misses merged
/// into refilled data, full-line allocation (empty mask), and eviction
/// filtering in the backend (only dirty bytes are taken).
///
/// The result has the length of `existing`; incoming bytes past that are ignored
/// and missing incoming bytes leave the existing byte in place.
pub fn merge_bytes(existing: &[u8], incoming: &[u8], preserve: ByteMask) -> Vec<u8> {
    existing
        .iter()
        .enumerate()
        .map(|(i, &old)| match incoming.get(i) {
            Some(&new) if !preserve.is_set(i) => new,
            _ => old,
        })
        .collect()
}
