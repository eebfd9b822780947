//! Error taxonomy for the bridge, the cache engine and their configuration.
//!
//! This module defines every error the model can surface. It provides:
//! 1. **Configuration Errors:** Geometry and queue parameters rejected at construction.
//! 2. **Unsupported Requests:** Narrow-bus shapes the bridge refuses without touching the cache.
//! 3. **Backend Errors:** DRAM failures observed during eviction or refill.
//! 4. **Bus Errors:** The union of the two, carried on narrow error responses.

use std::fmt;

use thiserror::Error;

/// Configuration rejected while building the cache geometry or its queues.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The line is not a whole number of narrow words.
    #[error("line width of {line_bits} bits is not a multiple of the {narrow_bits}-bit narrow bus")]
    LineNotNarrowMultiple {
        /// Requested line width in bits.
        line_bits: usize,
        /// Narrow bus width in bits.
        narrow_bits: usize,
    },

    /// The line size cannot be split into a byte-offset field.
    #[error("line width of {line_bytes} bytes is not a power of two")]
    LineNotPowerOfTwo {
        /// Requested line width in bytes.
        line_bytes: usize,
    },

    /// The line has more bytes than a mask can describe.
    #[error("line width of {line_bytes} bytes exceeds the {max} byte limit")]
    LineTooWide {
        /// Requested line width in bytes.
        line_bytes: usize,
        /// Largest supported line width in bytes.
        max: usize,
    },

    /// The set count cannot be split into an index field.
    #[error("set count {0} is not a non-zero power of two")]
    SetCountNotPowerOfTwo(usize),

    /// The address is too narrow for the offset and index fields.
    #[error("address width {addr_width} cannot hold {needed} offset and index bits")]
    AddressTooNarrow {
        /// Configured address width in bits.
        addr_width: u32,
        /// Bits consumed by offset plus index.
        needed: u32,
    },

    /// The address does not fit the 64-bit host representation.
    #[error("address width {0} exceeds 64 bits")]
    AddressTooWide(u32),

    /// A bounded queue was configured without any slots.
    #[error("{0} queue depth must be at least 1")]
    ZeroQueueDepth(&'static str),
}

/// A narrow-bus request shape the bridge does not support.
///
/// These are answered with a single error response and never reach the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum UnsupportedRequest {
    /// The address is not aligned to the narrow word.
    #[error("address {addr:#x} is not aligned to the narrow word")]
    Unaligned {
        /// Offending address.
        addr: u64,
    },

    /// The transfer length is not a whole number of narrow words.
    #[error("transfer length {length} (bytes - 1) is not a whole number of narrow words")]
    BadLength {
        /// Declared length field (bytes - 1).
        length: u32,
    },

    /// Writes longer than one narrow word are not supported.
    #[error("burst write of length {length} (bytes - 1) is not supported")]
    BurstWrite {
        /// Declared length field (bytes - 1).
        length: u32,
    },

    /// The request is neither a read nor a write, or claims to be both.
    #[error("request must be exactly one of read or write")]
    BadOperation,

    /// The transfer extends past the end of the address space.
    #[error("transfer at {addr:#x} extends beyond the address space")]
    OutOfRange {
        /// Start address of the transfer.
        addr: u64,
    },
}

/// Stage of a miss during which the DRAM backend reported an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendPhase {
    /// Write-back of a dirty victim line.
    Evict,
    /// Fetch of the requested line.
    Refill,
}

impl fmt::Display for BackendPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evict => write!(f, "eviction"),
            Self::Refill => write!(f, "refill"),
        }
    }
}

/// The DRAM backend answered a line operation with `error = true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("backend error during {phase} of line {addr:#x}")]
pub struct BackendError {
    /// Line-aligned address of the failed operation.
    pub addr: u64,
    /// Which half of the miss sequence failed.
    pub phase: BackendPhase,
}

/// Error carried on a narrow-bus error response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// Rejected by the bridge.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedRequest),
    /// Failed in the DRAM backend.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure of the blocking simulation helpers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// No response beat arrived within the hang-detection window.
    #[error("no response for {cycles} cycles")]
    Hang {
        /// Cycles waited without progress.
        cycles: u64,
    },
    /// The request completed with an error response.
    #[error(transparent)]
    Bus(#[from] BusError),
}
