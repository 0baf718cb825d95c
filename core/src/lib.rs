//! chunkpipe-core
//!
//! Parallel chunked transform pipeline: a source stream is split into
//! sequence-numbered chunks, transformed by a pool of workers, and written
//! back in original order.
//! No async runtime, no signal handling.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod telemetry;
pub mod transform;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::stream::{
        decode_stream, encode_stream, run_file, run_pipeline, CancelToken, Direction, InputSource, OutputSink,
        PipelineConfig,
    };
    pub use crate::telemetry::{Outcome, PipelineReport};
    pub use crate::transform::{Transform, TransformError};
    pub use crate::types::StreamError;
}
