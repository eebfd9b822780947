//! Direct-mapped write-back cache.
//!
//! This module implements the cache between the bus-width bridge and DRAM. It provides:
//! 1. **Line:** Per-index tag, valid, data and per-byte dirty state.
//! 2. **Engine:** Hit/miss lookup, eviction of dirty bytes, refill and write-allocate,
//!    sequenced by a one-request-in-flight state machine.

/// Cache engine state machine and its command/response types.
pub mod engine;

/// Single cache slot.
pub mod line;

pub use engine::{CacheCmd, CacheEngine, CacheRsp, EngineState, PendingRequest};
pub use line::CacheLine;
