use std::fmt;
use std::io;
use std::sync::Arc;

use bytes::Bytes;

use crate::types::StreamError;

/// Which way the transform runs. Fixed per pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Fixed-size blocks in, framed text lines out.
    Encode,
    /// Newline-delimited row groups in, raw bytes out.
    Decode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encode => f.write_str("encode"),
            Direction::Decode => f.write_str("decode"),
        }
    }
}

/// Sequence-numbered unit of payload.
///
/// The sequence number is assigned once by the chunker and carried unchanged
/// through the worker that transforms the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub sequence: u64,
    pub payload: Bytes,
}

impl Chunk {
    pub fn new(sequence: u64, payload: impl Into<Bytes>) -> Self {
        Self { sequence, payload: payload.into() }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Index of a worker in `0..N`, fixed for the worker's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Dispatcher → worker, on the worker's private channel.
#[derive(Debug)]
pub enum Response {
    /// Next piece of work.
    Chunk(Chunk),
    /// No more work. `cancelled` is set when the stop came from a cancel request.
    Terminate { cancelled: bool },
    /// The source failed; every worker receives the same error.
    Abort(Arc<io::Error>),
}

/// Worker → sink, on the shared inbound channel.
#[derive(Debug)]
pub enum SinkMessage {
    /// A transformed chunk, same sequence number as the one pulled.
    Chunk(Chunk),
    /// The worker drained its termination signal and will send nothing further.
    Completed { worker: WorkerId, cancelled: bool },
    /// The worker hit, or was told about, a fatal error.
    Failed { worker: WorkerId, error: StreamError },
}
