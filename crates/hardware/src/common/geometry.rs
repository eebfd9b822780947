//! Cache geometry and address decomposition.
//!
//! A cache-side address of `addr_width` bits splits into `tag | index | offset`:
//! 1. **Offset:** Selects a byte within the line (`log2(line_bytes)` bits).
//! 2. **Index:** Selects one of `set_count` lines (`log2(set_count)` bits).
//! 3. **Tag:** The remaining high bits, compared on lookup.
//!
//! The geometry also knows how a line divides into narrow-bus lanes.

use super::constants::{MAX_LINE_BYTES, NARROW_BYTES};
use super::error::ConfigError;

/// Address fields of one access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineLocation {
    /// High address bits identifying the line.
    pub tag: u64,
    /// Cache slot the line maps to.
    pub index: usize,
    /// Byte within the line.
    pub offset: usize,
}

/// Validated, immutable shape of a direct-mapped cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    addr_width: u32,
    line_bytes: usize,
    set_count: usize,
    offset_bits: u32,
    index_bits: u32,
}

impl Geometry {
    /// Validates the parameters and derives the field widths.
    ///
    /// # Arguments
    ///
    /// * `addr_width` - Width of a cache-side address in bits (at most 64).
    /// * `line_bytes` - Line size in bytes; a power-of-two multiple of the narrow word.
    /// * `set_count` - Number of lines; a non-zero power of two.
    ///
    /// # Returns
    ///
    /// The geometry, or the first [`ConfigError`] found.
    pub fn new(addr_width: u32, line_bytes: usize, set_count: usize) -> Result<Self, ConfigError> {
        if line_bytes == 0 || line_bytes % NARROW_BYTES != 0 {
            return Err(ConfigError::LineNotNarrowMultiple {
                line_bits: line_bytes * 8,
                narrow_bits: NARROW_BYTES * 8,
            });
        }
        if !line_bytes.is_power_of_two() {
            return Err(ConfigError::LineNotPowerOfTwo { line_bytes });
        }
        if line_bytes > MAX_LINE_BYTES {
            return Err(ConfigError::LineTooWide {
                line_bytes,
                max: MAX_LINE_BYTES,
            });
        }
        if !set_count.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo(set_count));
        }
        if addr_width > 64 {
            return Err(ConfigError::AddressTooWide(addr_width));
        }

        let offset_bits = line_bytes.trailing_zeros();
        let index_bits = set_count.trailing_zeros();
        if offset_bits + index_bits > addr_width {
            return Err(ConfigError::AddressTooNarrow {
                addr_width,
                needed: offset_bits + index_bits,
            });
        }

        Ok(Self {
            addr_width,
            line_bytes,
            set_count,
            offset_bits,
            index_bits,
        })
    }

    /// Address width in bits.
    #[inline]
    pub const fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// Line size in bytes.
    #[inline]
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Number of lines (sets) in the cache.
    #[inline]
    pub const fn set_count(&self) -> usize {
        self.set_count
    }

    /// Width of the byte-offset field.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the index field.
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Width of the tag field; `tag + index + offset == addr_width`.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        self.addr_width - self.index_bits - self.offset_bits
    }

    /// Number of narrow-word lanes per line.
    #[inline]
    pub const fn lanes(&self) -> usize {
        self.line_bytes / NARROW_BYTES
    }

    /// Highest byte address inside the address space.
    #[inline]
    pub const fn max_addr(&self) -> u64 {
        if self.addr_width == 64 {
            u64::MAX
        } else {
            (1u64 << self.addr_width) - 1
        }
    }

    /// Returns `true` if `bytes` bytes starting at `start` fit the address space.
    pub fn contains(&self, start: u64, bytes: u64) -> bool {
        bytes > 0
            && start
                .checked_add(bytes - 1)
                .is_some_and(|end| end <= self.max_addr())
    }

    /// Splits an address into tag, index and byte offset.
    ///
    /// Bits above `addr_width` are ignored.
    pub fn decompose(&self, addr: u64) -> LineLocation {
        let addr = addr & self.max_addr();
        let offset = (addr & (self.line_bytes as u64 - 1)) as usize;
        let index = ((addr >> self.offset_bits) & (self.set_count as u64 - 1)) as usize;
        let tag = addr
            .checked_shr(self.offset_bits + self.index_bits)
            .unwrap_or(0);
        LineLocation { tag, index, offset }
    }

    /// Rebuilds the base address of the line holding `tag` at `index`.
    pub fn compose(&self, tag: u64, index: usize) -> u64 {
        let high = tag
            .checked_shl(self.offset_bits + self.index_bits)
            .unwrap_or(0);
        (high | ((index as u64) << self.offset_bits)) & self.max_addr()
    }

    /// Clears the byte-offset bits of `addr`.
    #[inline]
    pub fn line_base(&self, addr: u64) -> u64 {
        addr & !(self.line_bytes as u64 - 1) & self.max_addr()
    }

    /// Lane of the line that a narrow-word access at `addr` falls in.
    #[inline]
    pub fn lane_of(&self, addr: u64) -> usize {
        self.decompose(addr).offset / NARROW_BYTES
    }
}
