//! Pull/transform/push worker.
//!
//! Workers never talk to each other. Each one asks the dispatcher for work,
//! transforms it, and forwards the result to the sink before asking again.

use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, error};

use crate::stream::types::{Chunk, Direction, Response, SinkMessage, WorkerId};
use crate::telemetry::{InFlightGauge, Stage, StageTimes};
use crate::transform::{framing, Transform, TransformError};
use crate::types::StreamError;

pub struct Worker {
    id: WorkerId,
    direction: Direction,
    transform: Arc<dyn Transform>,
    requests: Sender<WorkerId>,
    responses: Receiver<Response>,
    sink: Sender<SinkMessage>,
    gauge: InFlightGauge,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        direction: Direction,
        transform: Arc<dyn Transform>,
        requests: Sender<WorkerId>,
        responses: Receiver<Response>,
        sink: Sender<SinkMessage>,
        gauge: InFlightGauge,
    ) -> Self {
        Self { id, direction, transform, requests, responses, sink, gauge }
    }

    /// Run until terminated or failed; returns the time spent transforming.
    pub fn run(self) -> StageTimes {
        let mut stage_times = StageTimes::default();
        debug!(worker = %self.id, "starting");

        loop {
            if self.requests.send(self.id).is_err() {
                // Dispatcher is gone; whatever it left on our channel decides the exit.
                debug!(worker = %self.id, "request channel closed");
            }

            match self.responses.recv() {
                Ok(Response::Chunk(chunk)) => {
                    let sequence = chunk.sequence;
                    let result = stage_times.measure(Stage::Transform, || self.apply(&chunk));

                    match result {
                        Ok(out) => {
                            let sent = self.sink.send(SinkMessage::Chunk(out));
                            self.gauge.release();
                            if sent.is_err() {
                                debug!(worker = %self.id, sequence, "sink closed, exiting");
                                break;
                            }
                        }
                        Err(source) => {
                            self.gauge.release();
                            error!(worker = %self.id, sequence, error = %source, "transform failed");
                            self.fail(StreamError::Transform { sequence, source });
                            break;
                        }
                    }
                }
                Ok(Response::Terminate { cancelled }) => {
                    debug!(worker = %self.id, cancelled, "terminated");
                    if self.sink.send(SinkMessage::Completed { worker: self.id, cancelled }).is_err() {
                        debug!(worker = %self.id, "sink closed before completion");
                    }
                    break;
                }
                Ok(Response::Abort(err)) => {
                    self.fail(StreamError::SourceRead(err));
                    break;
                }
                Err(_) => {
                    self.fail(StreamError::Pipeline("dispatcher disconnected without terminating worker"));
                    break;
                }
            }
        }

        debug!(worker = %self.id, "finished");
        stage_times
    }

    /// Transform one chunk, keeping its sequence number.
    fn apply(&self, chunk: &Chunk) -> Result<Chunk, TransformError> {
        let payload = match self.direction {
            Direction::Encode => framing::encode_block(self.transform.as_ref(), &chunk.payload)?,
            Direction::Decode => framing::decode_rows(self.transform.as_ref(), &chunk.payload)?,
        };
        Ok(Chunk::new(chunk.sequence, payload))
    }

    fn fail(&self, error: StreamError) {
        if self.sink.send(SinkMessage::Failed { worker: self.id, error }).is_err() {
            debug!(worker = %self.id, "sink closed, failure already reported");
        }
    }
}
