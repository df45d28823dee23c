//! Unbounded FIFO buffer for requests awaiting admission to the pipeline.
//!
//! The feeder drains the cache at a bounded rate; the analyzer path refills
//! it with newly discovered requests. Closing the cache makes `get` yield
//! `None` forever and `put` reject, which is how `Stop` starves the feeder.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::types::CrawlRequest;

#[derive(Debug, Default)]
pub struct RequestCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    queue: VecDeque<CrawlRequest>,
    closed: bool,
    put_total: u64,
    got_total: u64,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request. Returns `false` once the cache is closed.
    pub fn put(&self, req: CrawlRequest) -> bool {
        let mut state = self.state.lock().expect("request cache mutex poisoned");
        if state.closed {
            return false;
        }
        state.queue.push_back(req);
        state.put_total += 1;
        true
    }

    /// Removes and returns the oldest request, or `None` when empty or closed.
    pub fn get(&self) -> Option<CrawlRequest> {
        let mut state = self.state.lock().expect("request cache mutex poisoned");
        if state.closed {
            return None;
        }
        let req = state.queue.pop_front();
        if req.is_some() {
            state.got_total += 1;
        }
        req
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("request cache mutex poisoned").queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cache is logically unbounded, so there is no capacity to report.
    pub fn capacity(&self) -> Option<usize> {
        None
    }

    pub fn close(&self) {
        self.state.lock().expect("request cache mutex poisoned").closed = true;
    }

    pub fn closed(&self) -> bool {
        self.state.lock().expect("request cache mutex poisoned").closed
    }

    pub fn summary(&self) -> String {
        let state = self.state.lock().expect("request cache mutex poisoned");
        let status = if state.closed { "closed" } else { "running" };
        format!(
            "status: {status}, length: {}, capacity: unbounded, put: {}, got: {}",
            state.queue.len(),
            state.put_total,
            state.got_total
        )
    }
}
