//! Wide command/response channel to the DRAM controller.
//!
//! This module defines the boundary between the cache engine and external memory:
//! 1. **Requests:** Line-aligned reads and masked line writes.
//! 2. **Responses:** Line data plus an error flag.
//! 3. **Backend Trait:** A channel that may refuse requests (stall) and answers
//!    after an arbitrary number of cycles.

use crate::common::ByteMask;

/// One wide operation sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DramRequest {
    /// Line-aligned byte address.
    pub address: u64,
    /// `true` for a write, `false` for a read.
    pub is_write: bool,
    /// Write data, one full line (ignored for reads).
    pub data: Vec<u8>,
    /// Preserve mask: a set bit keeps the stored byte.
    pub mask: ByteMask,
}

impl DramRequest {
    /// Builds a line read. Data is zero and every byte is preserved.
    pub fn read(address: u64, line_bytes: usize) -> Self {
        Self {
            address,
            is_write: false,
            data: vec![0; line_bytes],
            mask: ByteMask::full(line_bytes),
        }
    }

    /// Builds a masked line write.
    pub fn write(address: u64, data: Vec<u8>, mask: ByteMask) -> Self {
        Self {
            address,
            is_write: true,
            data,
            mask,
        }
    }

    /// Bytes this request actually overwrites in a `line_bytes` line.
    pub fn written_bytes(&self, line_bytes: usize) -> ByteMask {
        if self.is_write {
            self.mask.invert(line_bytes)
        } else {
            ByteMask::EMPTY
        }
    }
}

/// Completion of a [`DramRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DramResponse {
    /// Line data for reads; unspecified for writes.
    pub data: Vec<u8>,
    /// The operation failed; storage may not have been updated.
    pub error: bool,
}

impl DramResponse {
    /// A successful response carrying `data`.
    pub fn ok(data: Vec<u8>) -> Self {
        Self { data, error: false }
    }

    /// An error response.
    pub fn failed() -> Self {
        Self {
            data: Vec::new(),
            error: true,
        }
    }
}

/// Asynchronous command/response channel to external memory.
///
/// Responses are returned in request order. The engine keeps at most one
/// request outstanding, so implementations need not reorder.
pub trait DramBackend: Send {
    /// Offers a request. Returns it unchanged if the backend is stalled.
    fn try_issue(&mut self, req: DramRequest) -> Result<(), DramRequest>;

    /// Takes the oldest completed response, if one is ready.
    fn poll_response(&mut self) -> Option<DramResponse>;

    /// Advances backend time by one cycle.
    fn tick(&mut self) {}
}

impl<B: DramBackend + ?Sized> DramBackend for Box<B> {
    fn try_issue(&mut self, req: DramRequest) -> Result<(), DramRequest> {
        (**self).try_issue(req)
    }

    fn poll_response(&mut self) -> Option<DramResponse> {
        (**self).poll_response()
    }

    fn tick(&mut self) {
        (**self).tick();
    }
}
