//! telemetry/timers.rs
//! Stage timers for the pipeline.

use std::collections::{hash_map, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Source reads, owned by the dispatcher.
    Read,
    /// Transform calls, summed over all workers.
    Transform,
    /// Destination writes, owned by the sink.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read      => "read",
            Stage::Transform => "transform",
            Stage::Write     => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    /// Time a closure and charge it to `stage`.
    pub fn measure<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add(stage, start.elapsed());
        out
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn get_ms(&self, stage: Stage) -> f64 {
        self.get(stage).as_secs_f64() * 1_000.0
    }

    pub fn total(&self) -> Duration {
        self.times.values().copied().sum()
    }

    pub fn merge(&mut self, other: &StageTimes) {
        for (stage, dur) in other {
            self.add(*stage, *dur);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stage, &Duration)> {
        self.times.iter()
    }

    /// One-line human summary, stages in pipeline order.
    pub fn summary(&self) -> String {
        [Stage::Read, Stage::Transform, Stage::Write]
            .iter()
            .map(|s| format!("{}={:.2}ms", s, self.get_ms(*s)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> IntoIterator for &'a StageTimes {
    type Item = (&'a Stage, &'a Duration);
    type IntoIter = hash_map::Iter<'a, Stage, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.times.iter()
    }
}

#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    pub start_time: Instant,
    pub end_time: Option<Instant>,
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { start_time: Instant::now(), end_time: None }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => Instant::now().duration_since(self.start_time),
        }
    }
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}
