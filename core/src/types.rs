use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::transform::TransformError;

/// Unified pipeline error.
///
/// Setup failures surface directly. Once the pipeline has started, every
/// fatal condition is wrapped in [`StreamError::Aborted`] so callers always
/// learn the last sequence number committed to the destination.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O failure reading the source. Shared so it can be fanned out to every worker.
    #[error("source read failed: {0}")]
    SourceRead(Arc<io::Error>),

    /// The transform rejected a chunk.
    #[error("transform failed on chunk {sequence}: {source}")]
    Transform {
        sequence: u64,
        #[source]
        source: TransformError,
    },

    /// I/O failure writing the destination.
    #[error("sink write failed: {0}")]
    SinkWrite(#[source] io::Error),

    /// I/O error during setup (opening source or destination).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transform name not present in the registry.
    #[error("unknown transform: {0:?}")]
    UnknownTransform(String),

    /// Invalid configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal coordination failure (disconnected channel, panicked thread).
    #[error("pipeline error: {0}")]
    Pipeline(&'static str),

    /// Fatal condition after the pipeline started.
    #[error("pipeline aborted (last committed chunk: {}): {source}", fmt_committed(.last_committed))]
    Aborted {
        last_committed: Option<u64>,
        #[source]
        source: Box<StreamError>,
    },
}

impl StreamError {
    /// Last contiguous sequence number written before the failure, if any.
    pub fn last_committed(&self) -> Option<u64> {
        match self {
            StreamError::Aborted { last_committed, .. } => *last_committed,
            _ => None,
        }
    }

    /// The underlying cause, looking through [`StreamError::Aborted`].
    pub fn root(&self) -> &StreamError {
        match self {
            StreamError::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn fmt_committed(last: &Option<u64>) -> String {
    match last {
        Some(seq) => seq.to_string(),
        None => "none".into(),
    }
}
