//! telemetry/snapshot.rs
//! Immutable report returned by a pipeline run.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// How the run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Source exhausted and every chunk committed.
    Complete,
    /// Stopped by a cancel request; only the contiguous prefix was committed.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub outcome: Outcome,
    pub workers: usize,
    pub chunks_read: u64,
    pub chunks_committed: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Highest sequence number written, `None` if nothing was written.
    pub last_committed: Option<u64>,
    pub peak_in_flight: u64,
    pub elapsed: Duration,
    pub throughput_bytes_per_sec: f64,
    pub stage_times: StageTimes,
    /// Location of the unfinalized destination file after a cancelled run.
    pub partial_path: Option<PathBuf>,
    /// Captured destination bytes for in-memory sinks.
    #[serde(skip)]
    pub output: Option<Vec<u8>>,
}

impl PipelineReport {
    pub fn from(
        outcome: Outcome,
        workers: usize,
        counters: &TelemetryCounters,
        stage_times: StageTimes,
        peak_in_flight: u64,
        timer: &TelemetryTimer,
    ) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            outcome,
            workers,
            chunks_read: counters.chunks_read,
            chunks_committed: counters.chunks_written,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            last_committed: counters.chunks_written.checked_sub(1),
            peak_in_flight,
            elapsed,
            throughput_bytes_per_sec: throughput,
            stage_times,
            partial_path: None,
            output: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Complete
    }

    pub fn attach_output(&mut self, buf: Vec<u8>) {
        self.output = Some(buf);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
