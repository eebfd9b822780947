use mockall::mock;
use std::collections::VecDeque;
use widebridge_core::soc::memory::buffer::LineStore;
use widebridge_core::soc::{DramBackend, DramRequest, DramResponse};

mock! {
    pub Dram {}
    impl DramBackend for Dram {
        fn try_issue(&mut self, req: DramRequest) -> Result<(), DramRequest>;
        fn poll_response(&mut self) -> Option<DramResponse>;
        fn tick(&mut self);
    }
}

/// A backend that records every accepted request.
///
/// Storage behaves like real DRAM (preserve-mask writes, zero-filled reads).
/// Only one request is held at a time, which is all the engine ever needs.
#[derive(Debug)]
pub struct RecordingBackend {
    pub store: LineStore,
    pub log: Vec<DramRequest>,
    pending: VecDeque<(u64, DramResponse)>,
    latency: u64,
    cycle: u64,
    fail_remaining: usize,
}

impl RecordingBackend {
    pub fn new(line_bytes: usize, latency: u64) -> Self {
        Self {
            store: LineStore::new(line_bytes),
            log: Vec::new(),
            pending: VecDeque::new(),
            latency,
            cycle: 0,
            fail_remaining: 0,
        }
    }

    /// Answers the next `n` accepted requests with an error.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_remaining = n;
    }

    pub fn reads(&self) -> Vec<u64> {
        self.log
            .iter()
            .filter(|r| !r.is_write)
            .map(|r| r.address)
            .collect()
    }

    pub fn writes(&self) -> Vec<&DramRequest> {
        self.log.iter().filter(|r| r.is_write).collect()
    }
}

impl DramBackend for RecordingBackend {
    fn try_issue(&mut self, req: DramRequest) -> Result<(), DramRequest> {
        if !self.pending.is_empty() {
            return Err(req);
        }
        let response = if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            DramResponse::failed()
        } else if req.is_write {
            self.store.write_line(req.address, &req.data, req.mask);
            DramResponse::ok(Vec::new())
        } else {
            DramResponse::ok(self.store.read_line(req.address))
        };
        self.log.push(req);
        self.pending.push_back((self.cycle + self.latency, response));
        Ok(())
    }

    fn poll_response(&mut self) -> Option<DramResponse> {
        match self.pending.front() {
            Some((ready, _)) if *ready <= self.cycle => self.pending.pop_front().map(|(_, r)| r),
            _ => None,
        }
    }

    fn tick(&mut self) {
        self.cycle += 1;
    }
}
