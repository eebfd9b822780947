//! Write-back line cache behind a narrow-to-wide bus bridge.
//!
//! This crate models, cycle by cycle, the memory path between a CPU core speaking a
//! 32-bit, byte-maskable bus protocol and a DRAM controller speaking whole lines:
//! 1. **Bus:** The bus-width bridge validates narrow requests, places words into line
//!    lanes, inverts byte masks and replays burst reads as per-word lookups.
//! 2. **Cache:** A direct-mapped write-back cache with per-byte dirty tracking,
//!    write-allocate, and an evict-then-refill state machine.
//! 3. **SoC:** The DRAM command/response channel and a latency-modeled simulated DRAM.
//! 4. **Simulation:** A driver that ticks all three and collects statistics.

/// Common types (geometry, byte masks, queues, errors, constants).
pub mod common;
/// Configuration (geometry, queue depths, DRAM timing).
pub mod config;
/// Narrow bus types and the bus-width bridge.
pub mod bus;
/// Direct-mapped write-back cache engine.
pub mod cache;
/// DRAM channel and simulated backend.
pub mod soc;
/// Cycle driver composing bridge, cache and backend.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Narrow-to-wide bus adapter.
pub use crate::bus::BusWidthBridge;
/// Cache state machine.
pub use crate::cache::CacheEngine;
/// Composed model; construct with `MemorySystem::new`.
pub use crate::sim::MemorySystem;
