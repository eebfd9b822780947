//! Simulated DRAM backend.
//!
//! This module implements the external memory behind the cache engine. It provides:
//! 1. **Port:** Wide request/response types and the `DramBackend` channel trait.
//! 2. **Buffer:** Sparse line storage for memory contents.
//! 3. **Controller:** Latency modeling (simple or DRAM row-buffer) for timing simulation.
//! 4. **SimDram:** A `DramBackend` combining the three, with fault and stall injection.

/// Sparse line-granular backing store.
pub mod buffer;

/// Memory controller implementations for access latency modeling.
pub mod controller;

/// Wide command/response channel types and the backend trait.
pub mod port;

use std::collections::HashSet;
use std::fmt;

use self::buffer::LineStore;
use self::controller::MemoryController;
use self::port::{DramBackend, DramRequest, DramResponse};
use crate::common::{BoundedQueue, ByteMask, ConfigError};
use crate::config::MemoryConfig;

/// A request that has been accepted and is waiting out its latency.
#[derive(Clone, Debug)]
struct InFlight {
    ready_at: u64,
    response: DramResponse,
}

/// Latency-modeled DRAM with a bounded request queue.
///
/// Writes honor the preserve mask. Faulted lines answer every access with
/// `error = true` and are never modified.
pub struct SimDram {
    store: LineStore,
    controller: Box<dyn MemoryController>,
    in_flight: BoundedQueue<InFlight>,
    faults: HashSet<u64>,
    cycle: u64,
    stall_until: u64,
    served: u64,
}

impl fmt::Debug for SimDram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimDram")
            .field("cycle", &self.cycle)
            .field("in_flight", &self.in_flight.len())
            .field("resident_lines", &self.store.resident_lines())
            .field("faults", &self.faults.len())
            .finish_non_exhaustive()
    }
}

impl SimDram {
    /// Creates a backend of `line_bytes`-byte lines.
    ///
    /// # Arguments
    ///
    /// * `config` - Controller type, timing and queue depth.
    /// * `line_bytes` - Width of one line in bytes.
    pub fn new(config: &MemoryConfig, line_bytes: usize) -> Result<Self, ConfigError> {
        if config.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth("backend"));
        }
        Ok(Self {
            store: LineStore::new(line_bytes),
            controller: controller::from_config(config),
            in_flight: BoundedQueue::new(config.queue_depth),
            faults: HashSet::new(),
            cycle: 0,
            stall_until: 0,
            served: 0,
        })
    }

    /// Makes every access to the line at `addr` fail until cleared.
    pub fn inject_fault(&mut self, addr: u64) {
        let _ = self.faults.insert(self.line_base(addr));
    }

    /// Removes a fault injected with [`SimDram::inject_fault`].
    pub fn clear_fault(&mut self, addr: u64) {
        let _ = self.faults.remove(&self.line_base(addr));
    }

    /// Refuses all new requests for the next `cycles` cycles.
    pub fn stall_for(&mut self, cycles: u64) {
        self.stall_until = self.cycle + cycles;
    }

    /// Reads the stored line containing `addr` without timing.
    pub fn peek_line(&self, addr: u64) -> Vec<u8> {
        self.store.read_line(self.line_base(addr))
    }

    /// Overwrites the stored line containing `addr` without timing.
    pub fn poke_line(&mut self, addr: u64, data: &[u8]) {
        let base = self.line_base(addr);
        self.store.write_line(base, data, ByteMask::EMPTY);
    }

    /// Number of requests accepted so far.
    pub fn requests_served(&self) -> u64 {
        self.served
    }

    /// Returns `true` if no accepted request is still waiting.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    fn line_base(&self, addr: u64) -> u64 {
        addr & !(self.store.line_bytes() as u64 - 1)
    }

    fn execute(&mut self, req: &DramRequest) -> DramResponse {
        let base = self.line_base(req.address);
        if self.faults.contains(&base) {
            tracing::debug!("dram fault on line {base:#x}");
            return DramResponse::failed();
        }
        if req.is_write {
            self.store.write_line(base, &req.data, req.mask);
            DramResponse::ok(Vec::new())
        } else {
            DramResponse::ok(self.store.read_line(base))
        }
    }
}

impl DramBackend for SimDram {
    fn try_issue(&mut self, req: DramRequest) -> Result<(), DramRequest> {
        if self.cycle < self.stall_until || self.in_flight.is_full() {
            return Err(req);
        }
        let latency = self.controller.access_latency(req.address).max(1);
        let response = self.execute(&req);
        tracing::trace!(
            "dram accept {:#x} write={} latency={latency}",
            req.address,
            req.is_write
        );
        self.served += 1;
        self.in_flight
            .push(InFlight {
                ready_at: self.cycle + latency,
                response,
            })
            .map_err(|_| req)
    }

    fn poll_response(&mut self) -> Option<DramResponse> {
        match self.in_flight.front() {
            Some(head) if head.ready_at <= self.cycle => {
                self.in_flight.pop().map(|done| done.response)
            }
            _ => None,
        }
    }

    fn tick(&mut self) {
        self.cycle += 1;
    }
}
