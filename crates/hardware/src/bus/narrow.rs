//! Narrow (32-bit word) bus protocol types.
//!
//! Requests carry a byte mask in write convention (a set bit writes that byte)
//! and an opaque routing tag that the response echoes unchanged.

use crate::common::BusError;
use crate::common::constants::{NARROW_BYTES, NARROW_MASK_ALL};

/// Opaque requester identifier echoed on every response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RouteTag(pub u64);

/// One narrow-bus request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrowRequest {
    /// Byte address of the first word.
    pub address: u64,
    /// Read request.
    pub is_read: bool,
    /// Write request.
    pub is_write: bool,
    /// Transfer size in bytes minus one.
    pub length: u32,
    /// Write data (little-endian within the word).
    pub data: u32,
    /// Write mask, one bit per byte of `data` (1 = write).
    pub byte_mask: u8,
    /// Requester routing tag.
    pub route: RouteTag,
}

impl NarrowRequest {
    /// A single-word read.
    pub fn read(address: u64, route: RouteTag) -> Self {
        Self {
            address,
            is_read: true,
            is_write: false,
            length: NARROW_BYTES as u32 - 1,
            data: 0,
            byte_mask: 0,
            route,
        }
    }

    /// A single-word write of the bytes selected by `byte_mask`.
    pub fn write(address: u64, data: u32, byte_mask: u8, route: RouteTag) -> Self {
        Self {
            address,
            is_read: false,
            is_write: true,
            length: NARROW_BYTES as u32 - 1,
            data,
            byte_mask,
            route,
        }
    }

    /// A full-word write.
    pub fn write_word(address: u64, data: u32, route: RouteTag) -> Self {
        Self::write(address, data, NARROW_MASK_ALL, route)
    }

    /// A read of `words` consecutive narrow words.
    pub fn burst_read(address: u64, words: u32, route: RouteTag) -> Self {
        Self {
            length: words.max(1).saturating_mul(NARROW_BYTES as u32) - 1,
            ..Self::read(address, route)
        }
    }

    /// Number of bytes the request spans.
    pub fn bytes(&self) -> u64 {
        u64::from(self.length) + 1
    }
}

/// Outcome of a narrow transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The beat completed.
    Success,
    /// The request was rejected or the backend failed.
    Error(BusError),
}

impl Status {
    /// Returns `true` for [`Status::Success`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the error, if any.
    pub fn error(&self) -> Option<BusError> {
        match self {
            Self::Success => None,
            Self::Error(err) => Some(*err),
        }
    }
}

/// One narrow-bus response beat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrowResponse {
    /// Routing tag of the request being answered.
    pub route: RouteTag,
    /// Success or the reason for failure.
    pub status: Status,
    /// Read data (zero for writes and errors).
    pub data: u32,
    /// Final beat of the request.
    pub last: bool,
}

impl NarrowResponse {
    /// A single-beat error response.
    pub fn error(route: RouteTag, err: BusError) -> Self {
        Self {
            route,
            status: Status::Error(err),
            data: 0,
            last: true,
        }
    }
}
