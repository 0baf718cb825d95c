//! Pure pipeline wiring: dispatcher, N workers, reordering sink.
//!
//! Channels:
//! - one shared request channel, workers → dispatcher (`WorkerId`)
//! - one private response channel per worker, capacity 1
//! - one shared inbound channel, workers → sink

use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, unbounded};
use tracing::{error, info, warn};

use crate::stream::cancel::CancelToken;
use crate::stream::chunker::ChunkSource;
use crate::stream::dispatcher::{DispatchStop, Dispatcher};
use crate::stream::io::Destination;
use crate::stream::types::{Direction, Response, SinkMessage, WorkerId};
use crate::stream::sink::ReorderingSink;
use crate::stream::worker::Worker;
use crate::telemetry::{InFlightGauge, Outcome, PipelineReport, TelemetryTimer};
use crate::transform::Transform;
use crate::types::StreamError;

/// Immutable per-run context shared by all workers.
#[derive(Clone)]
pub struct PipelineContext {
    pub direction: Direction,
    pub transform: Arc<dyn Transform>,
    pub workers: usize,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("direction", &self.direction)
            .field("transform", &self.transform.name())
            .field("workers", &self.workers)
            .finish()
    }
}

/// Run the pipeline over an explicit chunk source and destination.
pub fn run_chunks<S>(
    source: S,
    destination: Destination<'_>,
    ctx: &PipelineContext,
    cancel: &CancelToken,
) -> Result<PipelineReport, StreamError>
where
    S: ChunkSource,
{
    if ctx.workers == 0 {
        return Err(StreamError::Validation("worker count must be at least 1".into()));
    }

    let mut timer = TelemetryTimer::new();
    let gauge = InFlightGauge::new();
    info!(direction = %ctx.direction, transform = ctx.transform.name(), workers = ctx.workers, "pipeline start");

    // ---- Channels ----
    let (request_tx, request_rx) = unbounded::<WorkerId>();
    let (sink_tx, sink_rx) = bounded::<SinkMessage>(ctx.workers);
    let (response_txs, response_rxs): (Vec<_>, Vec<_>) =
        (0..ctx.workers).map(|_| bounded::<Response>(1)).unzip();

    let (dispatch, sink_result, worker_times) = thread::scope(|scope| {
        // ---- Dispatcher ----
        let dispatcher = Dispatcher::new(source, request_rx, response_txs, cancel.clone(), gauge.clone());
        let dispatch_handle = scope.spawn(move || dispatcher.run());

        // ---- Workers ----
        let worker_handles: Vec<_> = response_rxs
            .into_iter()
            .enumerate()
            .map(|(i, rx)| {
                let worker = Worker::new(
                    WorkerId(i),
                    ctx.direction,
                    ctx.transform.clone(),
                    request_tx.clone(),
                    rx,
                    sink_tx.clone(),
                    gauge.clone(),
                );
                scope.spawn(move || worker.run())
            })
            .collect();

        // Only workers may hold these, so disconnection is observable.
        drop(request_tx);
        drop(sink_tx);

        // ---- Reordering sink (this thread) ----
        let sink_result = ReorderingSink::new(destination, ctx.workers).run(sink_rx);

        let dispatch = dispatch_handle.join();
        let worker_times: Vec<_> = worker_handles.into_iter().map(|h| h.join()).collect();
        (dispatch, sink_result, worker_times)
    });

    let summary = sink_result?;

    let dispatch = dispatch.map_err(|_| panicked(&summary, "dispatcher thread panicked"))?;
    let mut stage_times = dispatch.stage_times;
    stage_times.merge(&summary.stage_times);
    for times in worker_times {
        let times = times.map_err(|_| panicked(&summary, "worker thread panicked"))?;
        stage_times.merge(&times);
    }

    let mut counters = dispatch.counters;
    counters.merge(&summary.counters);

    timer.finish();
    let outcome = combine_outcome(dispatch.stop, summary.outcome);
    let mut report = PipelineReport::from(
        outcome,
        ctx.workers,
        &counters,
        stage_times,
        gauge.peak(),
        &timer,
    );
    report.partial_path = summary.finalized.partial_path;
    if let Some(buf) = summary.finalized.output {
        report.attach_output(buf);
    }

    info!(
        outcome = ?report.outcome,
        chunks = report.chunks_committed,
        bytes_out = report.bytes_out,
        elapsed = ?report.elapsed,
        stages = %report.stage_times.summary(),
        "pipeline finished"
    );
    Ok(report)
}

/// A run stopped by cancel is never reported complete, whatever the sink saw.
fn combine_outcome(stop: DispatchStop, sink: Outcome) -> Outcome {
    match (stop, sink) {
        (DispatchStop::Cancelled, Outcome::Complete) => {
            warn!("dispatcher was cancelled but sink saw no cancelled completion");
            Outcome::Cancelled
        }
        (_, outcome) => outcome,
    }
}

fn panicked(summary: &crate::stream::sink::SinkSummary, what: &'static str) -> StreamError {
    error!(what, "thread panicked after sink finished");
    StreamError::Aborted {
        last_committed: summary.counters.chunks_written.checked_sub(1),
        source: Box::new(StreamError::Pipeline(what)),
    }
}
