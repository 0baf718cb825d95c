//! Fan-in: collect transformed chunks in arrival order, write them in
//! sequence order.
//!
//! Only the contiguous prefix starting at `next_expected` is ever written.
//! Anything else waits in `pending` until the gap before it closes.

use std::collections::BTreeMap;
use std::time::Instant;

use bytes::Bytes;
use crossbeam::channel::Receiver;
use tracing::{debug, error, info, warn};

use crate::stream::io::{Destination, Finalized};
use crate::stream::types::SinkMessage;
use crate::telemetry::{Outcome, Stage, StageTimes, TelemetryCounters};
use crate::types::StreamError;

#[derive(Debug)]
pub struct SinkSummary {
    pub outcome: Outcome,
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
    pub finalized: Finalized,
}

pub struct ReorderingSink<'a> {
    destination: Destination<'a>,
    workers: usize,
    next_expected: u64,
    pending: BTreeMap<u64, Bytes>,
    completed: usize,
    cancelled: bool,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<'a> ReorderingSink<'a> {
    pub fn new(destination: Destination<'a>, workers: usize) -> Self {
        Self {
            destination,
            workers,
            next_expected: 0,
            pending: BTreeMap::new(),
            completed: 0,
            cancelled: false,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Highest sequence number written so far.
    pub fn last_committed(&self) -> Option<u64> {
        self.next_expected.checked_sub(1)
    }

    /// Drain `inbound` until every worker has completed and every chunk is written.
    ///
    /// On any fatal condition the destination is aborted and the error comes
    /// back wrapped in [`StreamError::Aborted`].
    pub fn run(mut self, inbound: Receiver<SinkMessage>) -> Result<SinkSummary, StreamError> {
        loop {
            // Block for the first message, then take whatever else is already queued.
            let first = match inbound.recv() {
                Ok(msg) => msg,
                Err(_) => {
                    return Err(self.abort(StreamError::Pipeline(
                        "all workers disconnected before signalling completion",
                    )));
                }
            };

            for msg in std::iter::once(first).chain(inbound.try_iter()) {
                if let Err(e) = self.accept(msg) {
                    return Err(self.abort(e));
                }
            }

            if let Err(e) = self.flush_ready() {
                return Err(self.abort(e));
            }

            if self.completed == self.workers {
                if !self.pending.is_empty() {
                    return Err(self.abort(StreamError::Pipeline(
                        "all workers completed with chunks missing before the pending set",
                    )));
                }
                return self.finish();
            }
        }
    }

    fn accept(&mut self, msg: SinkMessage) -> Result<(), StreamError> {
        match msg {
            SinkMessage::Chunk(chunk) => {
                if chunk.sequence < self.next_expected || self.pending.contains_key(&chunk.sequence) {
                    error!(sequence = chunk.sequence, "duplicate chunk");
                    return Err(StreamError::Pipeline("duplicate chunk sequence number"));
                }
                debug!(sequence = chunk.sequence, pending = self.pending.len(), "chunk received");
                self.pending.insert(chunk.sequence, chunk.payload);
                Ok(())
            }
            SinkMessage::Completed { worker, cancelled } => {
                self.completed += 1;
                self.cancelled |= cancelled;
                debug!(%worker, completed = self.completed, of = self.workers, "worker completed");
                Ok(())
            }
            SinkMessage::Failed { worker, error } => {
                error!(%worker, %error, "worker reported failure");
                Err(error)
            }
        }
    }

    /// Write the contiguous prefix now available, as one buffer.
    fn flush_ready(&mut self) -> Result<(), StreamError> {
        let mut cursor = self.next_expected;
        let mut buf = Vec::new();
        let mut lens = Vec::new();

        while let Some(payload) = self.pending.remove(&cursor) {
            buf.extend_from_slice(&payload);
            lens.push(payload.len());
            cursor += 1;
        }

        if lens.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        self.destination.write_all(&buf).map_err(StreamError::SinkWrite)?;
        self.stage_times.add(Stage::Write, start.elapsed());

        for len in lens {
            self.counters.add_written(len);
        }
        debug!(from = self.next_expected, to = cursor - 1, bytes = buf.len(), "committed");
        self.next_expected = cursor;
        Ok(())
    }

    fn finish(self) -> Result<SinkSummary, StreamError> {
        let last_committed = self.last_committed();
        let (outcome, finalized) = if self.cancelled {
            warn!(chunks = self.next_expected, "run cancelled, keeping committed prefix");
            (Outcome::Cancelled, self.destination.keep_partial())
        } else {
            (Outcome::Complete, self.destination.commit())
        };

        // A failed finalize discards the destination, so nothing counts as committed.
        let finalized = finalized.map_err(|e| {
            error!(?outcome, unpublished = ?last_committed, error = %e, "finalizing destination failed");
            StreamError::Aborted { last_committed: None, source: Box::new(StreamError::SinkWrite(e)) }
        })?;

        info!(?outcome, chunks = self.counters.chunks_written, bytes = self.counters.bytes_out, "sink finished");
        Ok(SinkSummary {
            outcome,
            counters: self.counters,
            stage_times: self.stage_times,
            finalized,
        })
    }

    fn abort(self, cause: StreamError) -> StreamError {
        let last_committed = self.last_committed();
        error!(?last_committed, error = %cause, "aborting destination");
        self.destination.abort();
        StreamError::Aborted { last_committed, source: Box::new(cause) }
    }
}
