//! Write-back cache engine.
//!
//! The engine owns the tag, valid, dirty and data arrays of a direct-mapped
//! cache and runs one request at a time through this state machine:
//!
//! ```text
//! Idle ──hit──> Idle
//!  │
//!  └─miss─┬─dirty victim─> IssueEvict ─> WaitEvictRsp ─┐
//!         └──────────────────────────────────────────────┴─> IssueRefill ─> WaitRefillRsp ─> Idle
//! ```
//!
//! A full-line write miss skips the refill read: `IssueRefill` commits the
//! write data directly. Backend errors answer the requester once and return the
//! engine to `Idle` with the index left invalid.

use super::line::CacheLine;
use crate::common::{
    BackendError, BackendPhase, BoundedQueue, ByteMask, ConfigError, Geometry, merge_bytes,
};
use crate::config::CacheConfig;
use crate::soc::memory::port::{DramBackend, DramRequest};
use crate::stats::CacheStats;

/// Line-granular request from the bridge.
///
/// `preserve` uses the cache-side convention: a set bit keeps the cached byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheCmd {
    /// Byte address; the offset bits select nothing here but are kept for tracing.
    pub address: u64,
    /// `true` for a write.
    pub write: bool,
    /// Full-line write data (zeros for reads).
    pub data: Vec<u8>,
    /// Preserve mask (full for reads).
    pub preserve: ByteMask,
    /// Opaque value echoed on the response.
    pub context: u64,
}

impl CacheCmd {
    /// A line read.
    pub fn read(address: u64, line_bytes: usize, context: u64) -> Self {
        Self {
            address,
            write: false,
            data: vec![0; line_bytes],
            preserve: ByteMask::full(line_bytes),
            context,
        }
    }

    /// A masked line write.
    pub fn write(address: u64, data: Vec<u8>, preserve: ByteMask, context: u64) -> Self {
        Self {
            address,
            write: true,
            data,
            preserve,
            context,
        }
    }
}

/// Completion of a [`CacheCmd`].
///
/// Reads carry the full line; writes carry a zero line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRsp {
    /// Context of the command this answers.
    pub context: u64,
    /// Line data or the backend failure.
    pub result: Result<Vec<u8>, BackendError>,
}

/// Engine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    /// Ready for a new request.
    #[default]
    Idle,
    /// Dirty victim write-back waiting for the backend to accept it.
    IssueEvict,
    /// Dirty victim write-back accepted, waiting for its response.
    WaitEvictRsp,
    /// Refill read (or direct allocation) pending.
    IssueRefill,
    /// Refill read accepted, waiting for line data.
    WaitRefillRsp,
}

/// The single in-flight miss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    /// Original command.
    pub cmd: CacheCmd,
    /// Cache index the miss maps to.
    pub index: usize,
    /// Tag of the requested line.
    pub tag: u64,
    /// `false` for a full-line write, which needs no refill read.
    pub need_refill: bool,
    /// Tag of the line that occupied `index` at miss time.
    pub victim_tag: u64,
}

/// Direct-mapped write-back cache with per-byte dirty tracking.
#[derive(Debug)]
pub struct CacheEngine {
    geometry: Geometry,
    lines: Vec<CacheLine>,
    state: EngineState,
    incoming: Option<CacheCmd>,
    pending: Option<PendingRequest>,
    responses: BoundedQueue<CacheRsp>,
    stats: CacheStats,
}

impl CacheEngine {
    /// Creates an empty cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Geometry and response FIFO depth.
    ///
    /// # Returns
    ///
    /// A cache with every line invalid, or the geometry error.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        Ok(Self::with_geometry(geometry, config.response_queue_depth))
    }

    /// Creates an empty cache from an already validated geometry.
    pub fn with_geometry(geometry: Geometry, response_depth: usize) -> Self {
        Self {
            lines: vec![CacheLine::empty(geometry.line_bytes()); geometry.set_count()],
            geometry,
            state: EngineState::Idle,
            incoming: None,
            pending: None,
            responses: BoundedQueue::new(response_depth),
            stats: CacheStats::default(),
        }
    }

    /// Cache geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns `true` if idle with no request latched.
    pub fn is_idle(&self) -> bool {
        self.state == EngineState::Idle && self.incoming.is_none()
    }

    /// Read-only view of the slot at `index`.
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// The in-flight miss, if any.
    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// Counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns `true` if [`CacheEngine::accept`] would take a command now.
    pub fn can_accept(&self) -> bool {
        self.is_idle()
    }

    /// Latches a command for lookup on the next tick.
    ///
    /// Data is padded or truncated to the line width, write masks are clipped to
    /// the line and reads always preserve every byte. Returns the command unchanged if the engine is busy.
    pub fn accept(&mut self, mut cmd: CacheCmd) -> Result<(), CacheCmd> {
        if !self.can_accept() {
            return Err(cmd);
        }
        let line_bytes = self.geometry.line_bytes();
        cmd.data.resize(line_bytes, 0);
        cmd.preserve = if cmd.write {
            ByteMask(cmd.preserve.bits() & ByteMask::full(line_bytes).bits())
        } else {
            ByteMask::full(line_bytes)
        };
        self.incoming = Some(cmd);
        Ok(())
    }

    /// Takes the oldest response.
    pub fn pop_response(&mut self) -> Option<CacheRsp> {
        self.responses.pop()
    }

    /// Returns `true` if a response is waiting.
    pub fn has_response(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Advances the state machine by one cycle.
    ///
    /// Nothing is committed unless the response FIFO has room for the answer,
    /// so backpressure delays the engine instead of dropping data.
    pub fn tick<B: DramBackend + ?Sized>(&mut self, backend: &mut B) {
        let before = self.state;
        match before {
            EngineState::Idle => self.lookup(),
            EngineState::IssueEvict => self.issue_evict(backend),
            EngineState::WaitEvictRsp => self.await_evict(backend),
            EngineState::IssueRefill => self.issue_refill(backend),
            EngineState::WaitRefillRsp => self.await_refill(backend),
        }
        if self.state != before {
            tracing::trace!("cache {:?} -> {:?}", before, self.state);
        }
    }

    fn lookup(&mut self) {
        if self.responses.is_full() {
            return;
        }
        let Some(cmd) = self.incoming.take() else {
            return;
        };

        let line_bytes = self.geometry.line_bytes();
        let loc = self.geometry.decompose(cmd.address);
        let line = &mut self.lines[loc.index];

        if line.matches(loc.tag) {
            let data = if cmd.write {
                self.stats.write_hits += 1;
                line.data = merge_bytes(&line.data, &cmd.data, cmd.preserve);
                line.dirty = line.dirty.union(cmd.preserve.invert(line_bytes));
                vec![0; line_bytes]
            } else {
                self.stats.read_hits += 1;
                line.data.clone()
            };
            tracing::debug!(
                "cache hit {:#x} index={} write={}",
                cmd.address,
                loc.index,
                cmd.write
            );
            self.respond(cmd.context, Ok(data));
            return;
        }

        if cmd.write {
            self.stats.write_misses += 1;
        } else {
            self.stats.read_misses += 1;
        }

        let needs_evict = line.valid && line.is_dirty();
        let victim_tag = line.tag;
        line.valid = false;
        if !needs_evict {
            line.dirty = ByteMask::EMPTY;
        }

        let need_refill = !(cmd.write && cmd.preserve.is_empty());
        tracing::debug!(
            "cache miss {:#x} index={} write={} evict={} refill={}",
            cmd.address,
            loc.index,
            cmd.write,
            needs_evict,
            need_refill
        );

        self.pending = Some(PendingRequest {
            index: loc.index,
            tag: loc.tag,
            need_refill,
            victim_tag,
            cmd,
        });
        self.state = if needs_evict {
            EngineState::IssueEvict
        } else {
            EngineState::IssueRefill
        };
    }

    fn issue_evict<B: DramBackend + ?Sized>(&mut self, backend: &mut B) {
        let Some(pending) = &self.pending else {
            self.state = EngineState::Idle;
            return;
        };
        let line_bytes = self.geometry.line_bytes();
        let line = &self.lines[pending.index];
        let addr = self.geometry.compose(pending.victim_tag, pending.index);
        let req = DramRequest::write(addr, line.data.clone(), line.dirty.invert(line_bytes));
        let dirty_bytes = line.dirty.count();

        if backend.try_issue(req).is_ok() {
            tracing::debug!("cache evict {addr:#x} dirty_bytes={dirty_bytes}");
            self.stats.evictions += 1;
            self.stats.bytes_written_back += u64::from(dirty_bytes);
            self.state = EngineState::WaitEvictRsp;
        }
    }

    fn await_evict<B: DramBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.responses.is_full() {
            return;
        }
        let Some(rsp) = backend.poll_response() else {
            return;
        };
        let Some(pending) = &self.pending else {
            self.state = EngineState::Idle;
            return;
        };

        let index = pending.index;
        let addr = self.geometry.compose(pending.victim_tag, index);
        let line = &mut self.lines[index];
        line.valid = false;
        line.dirty = ByteMask::EMPTY;

        if rsp.error {
            self.fail(BackendError {
                addr,
                phase: BackendPhase::Evict,
            });
        } else {
            self.state = EngineState::IssueRefill;
        }
    }

    fn issue_refill<B: DramBackend + ?Sized>(&mut self, backend: &mut B) {
        let Some(pending) = &self.pending else {
            self.state = EngineState::Idle;
            return;
        };

        if !pending.need_refill {
            if self.responses.is_full() {
                return;
            }
            let base = self.lines[pending.index].data.clone();
            self.stats.full_line_allocations += 1;
            self.commit(&base);
            return;
        }

        let addr = self.geometry.line_base(pending.cmd.address);
        let req = DramRequest::read(addr, self.geometry.line_bytes());
        if backend.try_issue(req).is_ok() {
            tracing::debug!("cache refill {addr:#x}");
            self.stats.refills += 1;
            self.state = EngineState::WaitRefillRsp;
        }
    }

    fn await_refill<B: DramBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.responses.is_full() {
            return;
        }
        let Some(rsp) = backend.poll_response() else {
            return;
        };
        let Some(pending) = &self.pending else {
            self.state = EngineState::Idle;
            return;
        };

        if rsp.error {
            let addr = self.geometry.line_base(pending.cmd.address);
            self.fail(BackendError {
                addr,
                phase: BackendPhase::Refill,
            });
        } else {
            let mut fill = rsp.data;
            fill.resize(self.geometry.line_bytes(), 0);
            self.commit(&fill);
        }
    }

    /// Installs the pending line on top of `base` and answers the requester.
    ///
    /// Reads (full preserve mask) keep `base` untouched; writes overlay their
    /// bytes and mark exactly those bytes dirty. Full-line writes (empty mask)
    /// replace `base` entirely.
    fn commit(&mut self, base: &[u8]) {
        let Some(pending) = self.pending.take() else {
            self.state = EngineState::Idle;
            return;
        };
        let line_bytes = self.geometry.line_bytes();
        let cmd = pending.cmd;
        let merged = merge_bytes(base, &cmd.data, cmd.preserve);
        let written = if cmd.write {
            cmd.preserve.invert(line_bytes)
        } else {
            ByteMask::EMPTY
        };

        let reply = if cmd.write {
            vec![0; line_bytes]
        } else {
            merged.clone()
        };
        self.lines[pending.index] = CacheLine {
            valid: true,
            tag: pending.tag,
            data: merged,
            dirty: written,
        };
        self.state = EngineState::Idle;
        self.respond(cmd.context, Ok(reply));
    }

    fn fail(&mut self, err: BackendError) {
        tracing::warn!("{err}");
        self.stats.backend_errors += 1;
        self.state = EngineState::Idle;
        let Some(pending) = self.pending.take() else {
            return;
        };
        let line = &mut self.lines[pending.index];
        line.valid = false;
        line.dirty = ByteMask::EMPTY;
        self.respond(pending.cmd.context, Err(err));
    }

    fn respond(&mut self, context: u64, result: Result<Vec<u8>, BackendError>) {
        if let Err(rsp) = self.responses.push(CacheRsp { context, result }) {
            // Every caller checks for room first.
            tracing::error!("cache response dropped for context {}", rsp.context);
        }
    }
}
