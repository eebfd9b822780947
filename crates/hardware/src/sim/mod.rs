//! Cycle driver for the complete model.
//!
//! Composes the bus-width bridge, the cache engine and a DRAM backend and
//! advances them together, with blocking helpers for tests and tools.

/// The composed memory system and its tick loop.
pub mod system;

pub use system::MemorySystem;
