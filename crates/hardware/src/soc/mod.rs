//! External memory behind the cache engine.
//!
//! This module holds everything on the far side of the wide command/response
//! channel: the channel types themselves and a simulated DRAM that implements them.

/// DRAM backend (port types, storage, latency controllers).
pub mod memory;

pub use memory::SimDram;
pub use memory::port::{DramBackend, DramRequest, DramResponse};
