//! Statistics collection and reporting.
//!
//! This module tracks performance counters for the model. It provides:
//! 1. **Cache:** Hits and misses by direction, evictions, refills, allocations, backend errors.
//! 2. **Bridge:** Accepted requests, bursts, beats and unsupported rejections.
//! 3. **Reporting:** Derived hit rate and a printable summary.

/// Counters maintained by the cache engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a valid matching line.
    pub read_hits: u64,
    /// Reads that started a miss sequence.
    pub read_misses: u64,
    /// Writes merged into a valid matching line.
    pub write_hits: u64,
    /// Writes that started a miss sequence.
    pub write_misses: u64,
    /// Dirty victims written back to the backend.
    pub evictions: u64,
    /// Dirty bytes carried by those write-backs.
    pub bytes_written_back: u64,
    /// Line reads issued to the backend.
    pub refills: u64,
    /// Write misses allocated straight from a full-line write.
    pub full_line_allocations: u64,
    /// Backend errors reported to requesters.
    pub backend_errors: u64,
}

impl CacheStats {
    /// Total lookups (hits plus misses).
    pub fn accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Total hits.
    pub fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Total misses.
    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Hit rate in percent; zero when nothing was accessed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            (self.hits() as f64 / total as f64) * 100.0
        }
    }
}

/// Counters maintained by the bus-width bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Requests accepted and forwarded to the cache.
    pub accepted: u64,
    /// Accepted requests that were burst reads.
    pub bursts: u64,
    /// Narrow response beats produced from cache responses.
    pub beats: u64,
    /// Requests answered with an unsupported-request error.
    pub unsupported: u64,
}

/// Snapshot of every counter in a memory system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemStats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Bridge counters.
    pub bridge: BridgeStats,
    /// Cache engine counters.
    pub cache: CacheStats,
}

impl SystemStats {
    /// Prints all counters to stdout.
    pub fn print(&self) {
        let c = &self.cache;
        let b = &self.bridge;
        println!("\n==========================================================");
        println!("CACHE BRIDGE STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("----------------------------------------------------------");
        println!("BRIDGE");
        println!("  bus.accepted           {}", b.accepted);
        println!("  bus.bursts             {}", b.bursts);
        println!("  bus.beats              {}", b.beats);
        println!("  bus.unsupported        {}", b.unsupported);
        println!("----------------------------------------------------------");
        println!("CACHE");
        println!(
            "  accesses: {:<10} | hits: {:<10} | hit_rate: {:.2}%",
            c.accesses(),
            c.hits(),
            c.hit_rate()
        );
        println!("  cache.read_hits        {}", c.read_hits);
        println!("  cache.read_misses      {}", c.read_misses);
        println!("  cache.write_hits       {}", c.write_hits);
        println!("  cache.write_misses     {}", c.write_misses);
        println!("  cache.evictions        {}", c.evictions);
        println!("  cache.bytes_written    {}", c.bytes_written_back);
        println!("  cache.refills          {}", c.refills);
        println!("  cache.allocations      {}", c.full_line_allocations);
        println!("  cache.backend_errors   {}", c.backend_errors);
        println!("==========================================================");
    }
}
