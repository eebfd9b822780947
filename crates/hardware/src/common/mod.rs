//! Common types shared by the bridge, the cache engine and the DRAM backend.
//!
//! This module provides the building blocks used throughout the model. It includes:
//! 1. **Geometry:** Address decomposition into tag, index and byte offset.
//! 2. **Masks:** Byte masks in write and preserve convention, and the byte-merge rule.
//! 3. **Queues:** A bounded FIFO with backpressure for response paths.
//! 4. **Error Handling:** Configuration, request and backend error types.
//! 5. **Constants:** Narrow-bus width, line limits and hang detection.

/// Common constants used throughout the model.
pub mod constants;

/// Error types for configuration, unsupported requests and backend failures.
pub mod error;

/// Address decomposition for a direct-mapped cache.
pub mod geometry;

/// Byte masks and the byte-merge rule.
pub mod mask;

/// Bounded FIFO with explicit backpressure.
pub mod queue;

pub use error::{
    BackendError, BackendPhase, BusError, ConfigError, SimError, UnsupportedRequest,
};
pub use geometry::{Geometry, LineLocation};
pub use mask::{ByteMask, merge_bytes};
pub use queue::BoundedQueue;
