//! Configuration system for the cache and bridge model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the model. It provides:
//! 1. **Defaults:** Baseline geometry, queue depths and DRAM timing.
//! 2. **Structures:** Hierarchical config for the cache, the narrow bus and the DRAM backend.
//! 3. **Enums:** Memory controller latency model.
//!
//! Configuration is fixed at construction. Use `Config::default()` or deserialize from JSON.

use serde::Deserialize;

use crate::common::constants::NARROW_BITS;
use crate::common::{ConfigError, Geometry};

/// Default configuration constants for the model.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in JSON.
mod defaults {
    /// Cache-side address width in bits (256 MiB address space).
    pub const ADDR_WIDTH: u32 = 28;

    /// Line width in bits (four narrow words).
    pub const LINE_BITS: usize = 128;

    /// Number of direct-mapped lines.
    pub const SET_COUNT: usize = 4;

    /// Depth of the engine's outbound response FIFO.
    pub const CACHE_RESPONSE_DEPTH: usize = 2;

    /// Depth of the bridge's narrow response FIFO.
    pub const BUS_RESPONSE_DEPTH: usize = 2;

    /// Fixed access latency of the simple controller in cycles.
    pub const LATENCY: u64 = 4;

    /// CAS (Column Access Strobe) latency in DRAM cycles.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in DRAM cycles.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in DRAM cycles.
    pub const T_PRE: u64 = 14;

    /// Bytes covered by one DRAM row.
    pub const ROW_BYTES: u64 = 2048;

    /// Maximum outstanding backend requests.
    pub const QUEUE_DEPTH: usize = 1;
}

/// Memory controller latency models for the simulated backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every access takes the same number of cycles.
    #[default]
    Simple,
    /// Open-row model with CAS, RAS and precharge latencies.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use widebridge_core::config::{Config, MemoryController};
///
/// let json = r#"{
///     "cache": { "addr_width": 32, "line_bits": 256, "set_count": 64 },
///     "memory": { "controller": "Dram", "t_cas": 10 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.cache.line_bits, 256);
/// assert_eq!(config.bus.response_queue_depth, 2);
/// assert_eq!(config.memory.controller, MemoryController::Dram);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and engine queues
    #[serde(default)]
    pub cache: CacheConfig,
    /// Narrow bus bridge parameters
    #[serde(default)]
    pub bus: BusConfig,
    /// Simulated DRAM backend
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates every section that has constraints.
    pub fn validate(&self) -> Result<Geometry, ConfigError> {
        if self.bus.response_queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth("bus response"));
        }
        if self.memory.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth("backend"));
        }
        self.cache.geometry()
    }
}

/// Direct-mapped cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Address width in bits
    #[serde(default = "CacheConfig::default_addr_width")]
    pub addr_width: u32,

    /// Line width in bits; a power-of-two multiple of the 32-bit narrow word
    #[serde(default = "CacheConfig::default_line_bits")]
    pub line_bits: usize,

    /// Number of lines (power of two)
    #[serde(default = "CacheConfig::default_set_count")]
    pub set_count: usize,

    /// Outbound response FIFO depth
    #[serde(default = "CacheConfig::default_response_depth")]
    pub response_queue_depth: usize,
}

impl CacheConfig {
    /// Returns the default address width.
    fn default_addr_width() -> u32 {
        defaults::ADDR_WIDTH
    }

    /// Returns the default line width in bits.
    fn default_line_bits() -> usize {
        defaults::LINE_BITS
    }

    /// Returns the default number of lines.
    fn default_set_count() -> usize {
        defaults::SET_COUNT
    }

    /// Returns the default response FIFO depth.
    fn default_response_depth() -> usize {
        defaults::CACHE_RESPONSE_DEPTH
    }

    /// Validates the geometry fields and derives the address split.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        if self.line_bits % NARROW_BITS != 0 {
            return Err(ConfigError::LineNotNarrowMultiple {
                line_bits: self.line_bits,
                narrow_bits: NARROW_BITS,
            });
        }
        if self.response_queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth("cache response"));
        }
        Geometry::new(self.addr_width, self.line_bits / 8, self.set_count)
    }
}

impl Default for CacheConfig {
    /// Creates the default 4-line, 128-bit-line, 28-bit-address cache.
    fn default() -> Self {
        Self {
            addr_width: defaults::ADDR_WIDTH,
            line_bits: defaults::LINE_BITS,
            set_count: defaults::SET_COUNT,
            response_queue_depth: defaults::CACHE_RESPONSE_DEPTH,
        }
    }
}

/// Narrow bus bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Narrow response FIFO depth
    #[serde(default = "BusConfig::default_response_depth")]
    pub response_queue_depth: usize,
}

impl BusConfig {
    /// Returns the default narrow response FIFO depth.
    fn default_response_depth() -> usize {
        defaults::BUS_RESPONSE_DEPTH
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            response_queue_depth: defaults::BUS_RESPONSE_DEPTH,
        }
    }
}

/// Simulated DRAM backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Memory controller type
    #[serde(default)]
    pub controller: MemoryController,

    /// Fixed latency for the simple controller
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// CAS latency (column access strobe)
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency (row access strobe)
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,

    /// Bytes per DRAM row
    #[serde(default = "MemoryConfig::default_row_bytes")]
    pub row_bytes: u64,

    /// Maximum outstanding requests before the backend stalls
    #[serde(default = "MemoryConfig::default_queue_depth")]
    pub queue_depth: usize,
}

impl MemoryConfig {
    /// Returns the default simple-controller latency.
    fn default_latency() -> u64 {
        defaults::LATENCY
    }

    /// Returns the default CAS latency in DRAM cycles.
    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    /// Returns the default RAS latency in DRAM cycles.
    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    /// Returns the default precharge latency in DRAM cycles.
    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    /// Returns the default row size in bytes.
    fn default_row_bytes() -> u64 {
        defaults::ROW_BYTES
    }

    /// Returns the default outstanding-request limit.
    fn default_queue_depth() -> usize {
        defaults::QUEUE_DEPTH
    }
}

impl Default for MemoryConfig {
    /// Creates a default memory configuration.
    ///
    /// Uses the simple controller with a single outstanding request.
    fn default() -> Self {
        Self {
            controller: MemoryController::default(),
            latency: defaults::LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            row_bytes: defaults::ROW_BYTES,
            queue_depth: defaults::QUEUE_DEPTH,
        }
    }
}
