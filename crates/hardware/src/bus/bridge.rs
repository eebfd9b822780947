//! Bus-width bridge between the narrow CPU bus and the line-granular cache.
//!
//! The bridge terminates the narrow protocol and performs:
//! 1. **Validation:** Unaligned, wrong-length, burst-write and malformed requests are
//!    answered with one error response and never reach the cache.
//! 2. **Expansion:** A narrow write becomes a line write with the word placed in its lane
//!    and the byte mask inverted into preserve convention (other lanes fully preserved).
//! 3. **Contraction:** A line read response is reduced to the lane of the request.
//! 4. **Bursts:** A burst read is accepted once and replayed as one cache read per beat,
//!    in ascending address order, with `last` set on the final beat.
//!
//! Only one request (single beat or whole burst) is in flight at a time.

use thiserror::Error;

use super::narrow::{NarrowRequest, NarrowResponse, RouteTag, Status};
use crate::cache::{CacheCmd, CacheRsp};
use crate::common::constants::{NARROW_BYTES, NARROW_MASK_ALL};
use crate::common::{BoundedQueue, BusError, ByteMask, ConfigError, Geometry, UnsupportedRequest};
use crate::config::BusConfig;
use crate::stats::BridgeStats;

/// The bridge could not take a request this cycle; the request is handed back.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("bridge busy; request not accepted")]
pub struct Busy(pub NarrowRequest);

/// Progress of the accepted request.
#[derive(Clone, Debug)]
struct Transfer {
    route: RouteTag,
    /// Address of the current beat.
    address: u64,
    /// Beats still owed, including the current one.
    beats_left: u32,
    write: bool,
    data: u32,
    byte_mask: u8,
    /// The current beat's command has been handed to the cache.
    issued: bool,
}

/// Narrow-to-wide bus adapter.
#[derive(Debug)]
pub struct BusWidthBridge {
    geometry: Geometry,
    active: Option<Transfer>,
    responses: BoundedQueue<NarrowResponse>,
    stats: BridgeStats,
}

impl BusWidthBridge {
    /// Creates a bridge in front of a cache of the given geometry.
    pub fn new(geometry: Geometry, config: &BusConfig) -> Result<Self, ConfigError> {
        if config.response_queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth("bus response"));
        }
        Ok(Self {
            geometry,
            active: None,
            responses: BoundedQueue::new(config.response_queue_depth),
            stats: BridgeStats::default(),
        })
    }

    /// Geometry of the cache behind the bridge.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Counters.
    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Returns `true` if no request is in flight.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Returns `true` if [`BusWidthBridge::submit`] would accept a request now.
    ///
    /// A new request needs an idle bridge and room for at least one response,
    /// since rejected requests are answered immediately.
    pub fn can_accept(&self) -> bool {
        self.active.is_none() && !self.responses.is_full()
    }

    /// Accepts a narrow request.
    ///
    /// Unsupported shapes are acknowledged and answered with a single error
    /// response. Returns [`Busy`] with the request if it cannot be accepted.
    pub fn submit(&mut self, req: NarrowRequest) -> Result<(), Busy> {
        if !self.can_accept() {
            return Err(Busy(req));
        }

        match self.validate(&req) {
            Ok(beats) => {
                tracing::debug!(
                    "bridge accept {:#x} write={} beats={beats}",
                    req.address,
                    req.is_write
                );
                self.stats.accepted += 1;
                if beats > 1 {
                    self.stats.bursts += 1;
                }
                self.active = Some(Transfer {
                    route: req.route,
                    address: req.address,
                    beats_left: beats,
                    write: req.is_write,
                    data: req.data,
                    byte_mask: req.byte_mask & NARROW_MASK_ALL,
                    issued: false,
                });
            }
            Err(reason) => {
                tracing::warn!("bridge reject {:#x}: {reason}", req.address);
                self.stats.unsupported += 1;
                self.emit(NarrowResponse::error(req.route, BusError::from(reason)));
            }
        }
        Ok(())
    }

    /// Checks a request shape and returns its beat count.
    pub fn validate(&self, req: &NarrowRequest) -> Result<u32, UnsupportedRequest> {
        if req.is_read == req.is_write {
            return Err(UnsupportedRequest::BadOperation);
        }
        if req.address % NARROW_BYTES as u64 != 0 {
            return Err(UnsupportedRequest::Unaligned { addr: req.address });
        }

        let bytes = req.bytes();
        if bytes < NARROW_BYTES as u64 || bytes % NARROW_BYTES as u64 != 0 {
            return Err(UnsupportedRequest::BadLength { length: req.length });
        }
        let beats = bytes / NARROW_BYTES as u64;
        if req.is_write && beats > 1 {
            return Err(UnsupportedRequest::BurstWrite { length: req.length });
        }
        if !self.geometry.contains(req.address, bytes) {
            return Err(UnsupportedRequest::OutOfRange { addr: req.address });
        }
        Ok(beats as u32)
    }

    /// Hands the current beat to the cache as a line command.
    ///
    /// Returns `None` if nothing is in flight or the beat is already issued.
    pub fn take_command(&mut self) -> Option<CacheCmd> {
        let geometry = self.geometry;
        let transfer = self.active.as_mut()?;
        if transfer.issued {
            return None;
        }
        transfer.issued = true;

        let context = transfer.route.0;
        let cmd = if transfer.write {
            let (data, preserve) =
                place_lane(&geometry, transfer.address, transfer.data, transfer.byte_mask);
            CacheCmd::write(transfer.address, data, preserve, context)
        } else {
            CacheCmd::read(transfer.address, geometry.line_bytes(), context)
        };
        Some(cmd)
    }

    /// Undoes [`BusWidthBridge::take_command`] when the cache refused the command.
    pub fn retract_command(&mut self) {
        if let Some(transfer) = self.active.as_mut() {
            transfer.issued = false;
        }
    }

    /// Returns `true` if a cache response can be turned into a narrow beat now.
    pub fn wants_response(&self) -> bool {
        self.active.as_ref().is_some_and(|t| t.issued) && !self.responses.is_full()
    }

    /// Converts the cache response for the current beat into a narrow beat.
    ///
    /// A backend error ends the request: the error beat is marked last.
    pub fn complete(&mut self, rsp: CacheRsp) {
        let geometry = self.geometry;
        let Some(transfer) = self.active.as_mut().filter(|t| t.issued) else {
            tracing::warn!("bridge got an unexpected cache response (context {})", rsp.context);
            return;
        };
        if rsp.context != transfer.route.0 {
            tracing::warn!(
                "bridge context mismatch: expected {}, got {}",
                transfer.route.0,
                rsp.context
            );
        }

        let (status, data, last) = match rsp.result {
            Ok(line) => {
                let data = if transfer.write {
                    0
                } else {
                    lane_word(&geometry, transfer.address, &line)
                };
                (Status::Success, data, transfer.beats_left <= 1)
            }
            Err(err) => (Status::Error(BusError::from(err)), 0, true),
        };
        let beat = NarrowResponse {
            route: transfer.route,
            status,
            data,
            last,
        };

        if last {
            self.active = None;
        } else {
            transfer.address += NARROW_BYTES as u64;
            transfer.beats_left -= 1;
            transfer.issued = false;
        }
        self.stats.beats += 1;
        self.emit(beat);
    }

    /// Takes the oldest narrow response.
    pub fn pop_response(&mut self) -> Option<NarrowResponse> {
        self.responses.pop()
    }

    /// Returns `true` if a narrow response is waiting.
    pub fn has_response(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Places a narrow write into a line: returns the line data and preserve mask.
    pub fn expand_write(&self, address: u64, data: u32, byte_mask: u8) -> (Vec<u8>, ByteMask) {
        place_lane(&self.geometry, address, data, byte_mask)
    }

    /// Extracts the narrow word addressed by `address` from a line.
    pub fn extract_read(&self, address: u64, line: &[u8]) -> u32 {
        lane_word(&self.geometry, address, line)
    }

    fn emit(&mut self, rsp: NarrowResponse) {
        if let Err(rsp) = self.responses.push(rsp) {
            // Callers check for room before producing a beat.
            tracing::error!("bridge response dropped for route {}", rsp.route.0);
        }
    }
}

/// Builds the line image and preserve mask of a narrow write.
fn place_lane(geometry: &Geometry, address: u64, data: u32, byte_mask: u8) -> (Vec<u8>, ByteMask) {
    let line_bytes = geometry.line_bytes();
    let first = geometry.lane_of(address) * NARROW_BYTES;
    let mut line = vec![0; line_bytes];
    line[first..first + NARROW_BYTES].copy_from_slice(&data.to_le_bytes());

    let written = ByteMask(u64::from(byte_mask & NARROW_MASK_ALL)).shifted(first);
    (line, written.invert(line_bytes))
}

/// Reads the narrow word of `address`'s lane out of a line.
fn lane_word(geometry: &Geometry, address: u64, line: &[u8]) -> u32 {
    let first = geometry.lane_of(address) * NARROW_BYTES;
    let mut word = [0u8; NARROW_BYTES];
    if let Some(bytes) = line.get(first..first + NARROW_BYTES) {
        word.copy_from_slice(bytes);
    }
    u32::from_le_bytes(word)
}
