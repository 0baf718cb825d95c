//! Single-owner coordinator between the chunker and the worker pool.
//!
//! Pull-based: a chunk is read only when a worker asks for one, so each worker
//! has at most one chunk in flight.

use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::stream::cancel::CancelToken;
use crate::stream::chunker::ChunkSource;
use crate::stream::types::{Response, WorkerId};
use crate::telemetry::{InFlightGauge, Stage, StageTimes, TelemetryCounters};

/// Why the dispatcher left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStop {
    /// Source reached end of stream; every worker was told to terminate.
    Exhausted,
    /// Cancel was requested; every worker was told to terminate.
    Cancelled,
    /// Source read failed; every worker was told to abort.
    SourceFailed,
    /// All workers hung up, or one dropped its response channel.
    Disconnected,
}

#[derive(Debug)]
pub struct DispatchSummary {
    pub stop: DispatchStop,
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
}

pub struct Dispatcher<S: ChunkSource> {
    source: S,
    requests: Receiver<WorkerId>,
    responses: Vec<Sender<Response>>,
    cancel: CancelToken,
    gauge: InFlightGauge,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<S: ChunkSource> Dispatcher<S> {
    pub fn new(
        source: S,
        requests: Receiver<WorkerId>,
        responses: Vec<Sender<Response>>,
        cancel: CancelToken,
        gauge: InFlightGauge,
    ) -> Self {
        Self {
            source,
            requests,
            responses,
            cancel,
            gauge,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Serve pull requests until the source is exhausted, fails, or is cancelled.
    pub fn run(mut self) -> DispatchSummary {
        let stop = self.serve();
        info!(?stop, chunks = self.counters.chunks_read, bytes = self.counters.bytes_in, "dispatcher finished");
        DispatchSummary {
            stop,
            counters: self.counters,
            stage_times: self.stage_times,
        }
    }

    fn serve(&mut self) -> DispatchStop {
        loop {
            let worker = match self.requests.recv() {
                Ok(id) => id,
                Err(_) => {
                    debug!("request channel closed, no workers left");
                    return DispatchStop::Disconnected;
                }
            };

            if self.cancel.is_cancelled() {
                warn!(next = self.counters.chunks_read, "cancel requested, stopping dispatch");
                self.terminate_all(true);
                return DispatchStop::Cancelled;
            }

            let start = Instant::now();
            let next = self.source.next_chunk();
            self.stage_times.add(Stage::Read, start.elapsed());

            match next {
                Ok(Some(chunk)) => {
                    let Some(tx) = self.responses.get(worker.0) else {
                        error!(%worker, "request from unknown worker");
                        return DispatchStop::Disconnected;
                    };
                    debug!(%worker, sequence = chunk.sequence, len = chunk.len(), "dispatching chunk");
                    self.counters.add_read(chunk.len());
                    self.gauge.acquire();
                    if tx.send(Response::Chunk(chunk)).is_err() {
                        self.gauge.release();
                        error!(%worker, "worker response channel closed");
                        return DispatchStop::Disconnected;
                    }
                }
                Ok(None) => {
                    debug!(%worker, "end of stream");
                    self.terminate_all(false);
                    return DispatchStop::Exhausted;
                }
                Err(e) => {
                    error!(error = %e, "source read failed");
                    let shared = Arc::new(e);
                    for (i, tx) in self.responses.iter().enumerate() {
                        if tx.send(Response::Abort(shared.clone())).is_err() {
                            debug!(worker = i, "worker already gone, abort not delivered");
                        }
                    }
                    return DispatchStop::SourceFailed;
                }
            }
        }
    }

    /// Tell every worker, not only the requester, that no more chunks will come.
    fn terminate_all(&self, cancelled: bool) {
        for (i, tx) in self.responses.iter().enumerate() {
            if tx.send(Response::Terminate { cancelled }).is_err() {
                debug!(worker = i, "worker already gone, termination not delivered");
            }
        }
    }
}
