//! Memory system: bridge, cache engine and DRAM backend driven cycle by cycle.
//!
//! Each call to [`MemorySystem::tick`] advances one clock:
//! 1. **Backend:** DRAM time moves forward so pending responses can mature.
//! 2. **Bridge -> Engine:** The bridge's current beat is latched if the engine is idle.
//! 3. **Engine:** One state-machine step (a hit completes in the same tick).
//! 4. **Engine -> Bridge:** A finished cache response becomes a narrow beat if there is room.

use crate::bus::{BusWidthBridge, Busy, NarrowRequest, NarrowResponse, RouteTag};
use crate::cache::CacheEngine;
use crate::common::constants::HANG_DETECTION_THRESHOLD;
use crate::common::{ConfigError, SimError};
use crate::config::Config;
use crate::soc::memory::SimDram;
use crate::soc::memory::port::DramBackend;
use crate::stats::SystemStats;

/// Narrow bus in, DRAM out.
#[derive(Debug)]
pub struct MemorySystem<B: DramBackend = SimDram> {
    bridge: BusWidthBridge,
    engine: CacheEngine,
    backend: B,
    cycles: u64,
    next_route: u64,
}

impl MemorySystem<SimDram> {
    /// Builds a system backed by a simulated DRAM.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        let backend = SimDram::new(&config.memory, geometry.line_bytes())?;
        Self::with_backend(config, backend)
    }
}

impl<B: DramBackend> MemorySystem<B> {
    /// Builds a system in front of an arbitrary backend.
    pub fn with_backend(config: &Config, backend: B) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        Ok(Self {
            bridge: BusWidthBridge::new(geometry, &config.bus)?,
            engine: CacheEngine::with_geometry(geometry, config.cache.response_queue_depth),
            backend,
            cycles: 0,
            next_route: 0,
        })
    }

    /// The bus-width bridge.
    pub fn bridge(&self) -> &BusWidthBridge {
        &self.bridge
    }

    /// The cache engine.
    pub fn engine(&self) -> &CacheEngine {
        &self.engine
    }

    /// The DRAM backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the DRAM backend (fault and stall injection).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Cycles simulated so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Snapshot of all counters.
    pub fn stats(&self) -> SystemStats {
        SystemStats {
            cycles: self.cycles,
            bridge: self.bridge.stats().clone(),
            cache: self.engine.stats().clone(),
        }
    }

    /// Returns `true` if nothing is in flight anywhere between the bus and DRAM.
    pub fn is_quiescent(&self) -> bool {
        self.bridge.is_idle() && self.engine.is_idle() && !self.engine.has_response()
    }

    /// Offers a narrow request to the bridge.
    pub fn submit(&mut self, req: NarrowRequest) -> Result<(), Busy> {
        self.bridge.submit(req)
    }

    /// Takes the oldest narrow response.
    pub fn pop_response(&mut self) -> Option<NarrowResponse> {
        self.bridge.pop_response()
    }

    /// Advances the whole system by one cycle.
    pub fn tick(&mut self) {
        self.backend.tick();

        if self.engine.can_accept()
            && let Some(cmd) = self.bridge.take_command()
            && self.engine.accept(cmd).is_err()
        {
            self.bridge.retract_command();
        }

        self.engine.tick(&mut self.backend);

        if self.bridge.wants_response()
            && let Some(rsp) = self.engine.pop_response()
        {
            self.bridge.complete(rsp);
        }

        self.cycles += 1;
    }

    /// Ticks until the system is quiescent or `limit` cycles pass.
    ///
    /// Returns the number of cycles run. Responses stay queued in the bridge,
    /// so a full response FIFO also stops progress.
    pub fn run_until_idle(&mut self, limit: u64) -> u64 {
        let mut ran = 0;
        while ran < limit && !self.is_quiescent() {
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Submits `req` and ticks until its final beat arrives.
    ///
    /// Responses still queued from earlier submissions come first in the
    /// returned vector, followed by every beat of `req`. Fails with
    /// [`SimError::Hang`] if no beat arrives for [`HANG_DETECTION_THRESHOLD`] cycles.
    pub fn transact(&mut self, req: NarrowRequest) -> Result<Vec<NarrowResponse>, SimError> {
        let mut collected = Vec::new();
        let mut waited = 0;
        let mut offer = req;

        loop {
            while let Some(rsp) = self.bridge.pop_response() {
                collected.push(rsp);
                waited = 0;
            }
            match self.bridge.submit(offer) {
                Ok(()) => break,
                Err(Busy(back)) => offer = back,
            }
            if waited >= HANG_DETECTION_THRESHOLD {
                return Err(SimError::Hang { cycles: waited });
            }
            self.tick();
            waited += 1;
        }

        waited = 0;
        loop {
            while let Some(rsp) = self.bridge.pop_response() {
                let last = rsp.last;
                collected.push(rsp);
                waited = 0;
                if last {
                    return Ok(collected);
                }
            }
            if waited >= HANG_DETECTION_THRESHOLD {
                tracing::warn!("memory system hang after {waited} idle cycles");
                return Err(SimError::Hang { cycles: waited });
            }
            self.tick();
            waited += 1;
        }
    }

    /// Reads one narrow word.
    pub fn read_word(&mut self, address: u64) -> Result<u32, SimError> {
        let route = self.fresh_route();
        let beats = self.transact(NarrowRequest::read(address, route))?;
        let beat = beats.last().ok_or(SimError::Hang { cycles: 0 })?;
        match beat.status.error() {
            Some(err) => Err(err.into()),
            None => Ok(beat.data),
        }
    }

    /// Writes the bytes of `data` selected by `byte_mask` (1 = write).
    pub fn write_word(&mut self, address: u64, data: u32, byte_mask: u8) -> Result<(), SimError> {
        let route = self.fresh_route();
        let beats = self.transact(NarrowRequest::write(address, data, byte_mask, route))?;
        match beats.last().and_then(|beat| beat.status.error()) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Reads `words` consecutive narrow words with one burst request.
    pub fn read_burst(&mut self, address: u64, words: u32) -> Result<Vec<u32>, SimError> {
        let route = self.fresh_route();
        let beats = self.transact(NarrowRequest::burst_read(address, words, route))?;
        let mut data = Vec::with_capacity(beats.len());
        for beat in beats.iter().filter(|beat| beat.route == route) {
            if let Some(err) = beat.status.error() {
                return Err(err.into());
            }
            data.push(beat.data);
        }
        Ok(data)
    }

    fn fresh_route(&mut self) -> RouteTag {
        self.next_route = self.next_route.wrapping_add(1);
        RouteTag(self.next_route)
    }
}
