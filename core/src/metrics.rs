use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub records_read: u64,
    pub admitted: u64,
    pub stale: u64,
    pub rejected: u64,
    pub rejected_by_reason: BTreeMap<String, u64>,
    pub evicted_edges: u64,
    pub peak_live_edges: usize,
}

impl RunMetrics {
    pub fn record_read(&mut self) {
        self.records_read += 1;
    }

    pub fn record_rejected(&mut self, reason: &str) {
        self.rejected += 1;
        *self.rejected_by_reason.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_stale(&mut self) {
        self.stale += 1;
    }

    pub fn record_admitted(&mut self, live_edges: usize) {
        self.admitted += 1;
        self.peak_live_edges = self.peak_live_edges.max(live_edges);
    }

    pub fn record_evicted(&mut self, count: usize) {
        self.evicted_edges += count as u64;
    }

    /// Events that produced an output line.
    pub fn emitted(&self) -> u64 {
        self.admitted + self.stale
    }
}
