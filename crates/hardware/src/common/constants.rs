//! Global Model Constants.
//!
//! This module defines constants shared by the bridge, the cache engine and the
//! simulation driver. It includes:
//! 1. **Narrow Bus:** Word width of the CPU-facing protocol.
//! 2. **Line Limits:** Upper bound on the wide line so byte masks fit a `u64`.
//! 3. **Simulation Constants:** Thresholds for hang detection.

/// Width of one narrow-bus word in bytes.
pub const NARROW_BYTES: usize = 4;

/// Width of one narrow-bus word in bits.
pub const NARROW_BITS: usize = NARROW_BYTES * 8;

/// Byte-mask value that selects every byte of a narrow word.
pub const NARROW_MASK_ALL: u8 = 0xF;

/// Largest supported line in bytes (one mask bit per byte in a `u64`).
pub const MAX_LINE_BYTES: usize = 64;

/// Maximum number of cycles the driver waits for a response before giving up.
pub const HANG_DETECTION_THRESHOLD: u64 = 5000;
