//! telemetry/counters.rs
//! Mutable counters used during a pipeline run.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected by the dispatcher (input side) and the
/// sink (output side).
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks_read: u64,
    pub chunks_written: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl TelemetryCounters {
    /// Record one chunk handed out by the dispatcher.
    pub fn add_read(&mut self, payload_len: usize) {
        self.chunks_read += 1;
        self.bytes_in += payload_len as u64;
    }

    /// Record one chunk committed to the destination.
    pub fn add_written(&mut self, payload_len: usize) {
        self.chunks_written += 1;
        self.bytes_out += payload_len as u64;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.chunks_read += other.chunks_read;
        self.chunks_written += other.chunks_written;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
