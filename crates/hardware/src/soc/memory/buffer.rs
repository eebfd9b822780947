//! Sparse line-granular backing store.
//!
//! The simulated DRAM keeps only the lines that have been written. Lines that
//! were never touched read back as zeros, so a 64-bit address space costs no
//! host memory up front.

use std::collections::HashMap;

use crate::common::{ByteMask, merge_bytes};

/// Backing storage keyed by line base address.
#[derive(Clone, Debug)]
pub struct LineStore {
    lines: HashMap<u64, Vec<u8>>,
    line_bytes: usize,
}

impl LineStore {
    /// Creates an empty store of `line_bytes`-byte lines.
    pub fn new(line_bytes: usize) -> Self {
        Self {
            lines: HashMap::new(),
            line_bytes,
        }
    }

    /// Line size in bytes.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Number of lines that have been materialized.
    pub fn resident_lines(&self) -> usize {
        self.lines.len()
    }

    /// Reads the line at `addr` (zeros if never written).
    pub fn read_line(&self, addr: u64) -> Vec<u8> {
        self.lines
            .get(&addr)
            .cloned()
            .unwrap_or_else(|| vec![0; self.line_bytes])
    }

    /// Writes `data` into the line at `addr`, keeping bytes selected by `preserve`.
    pub fn write_line(&mut self, addr: u64, data: &[u8], preserve: ByteMask) {
        let line_bytes = self.line_bytes;
        let line = self
            .lines
            .entry(addr)
            .or_insert_with(|| vec![0; line_bytes]);
        *line = merge_bytes(line, data, preserve);
    }
}
