//! One direct-mapped cache slot.

use crate::common::ByteMask;

/// Tag, validity, data and per-byte dirty state of one cache index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// The slot holds a copy of the line named by `tag`.
    pub valid: bool,
    /// High address bits of the cached line.
    pub tag: u64,
    /// Line contents.
    pub data: Vec<u8>,
    /// Bytes that differ from the backing store.
    pub dirty: ByteMask,
}

impl CacheLine {
    /// An invalid, zero-filled slot of `line_bytes` bytes.
    pub fn empty(line_bytes: usize) -> Self {
        Self {
            valid: false,
            tag: 0,
            data: vec![0; line_bytes],
            dirty: ByteMask::EMPTY,
        }
    }

    /// Returns `true` if the slot is valid and holds `tag`.
    #[inline]
    pub fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    /// Returns `true` if any byte needs writing back.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}
