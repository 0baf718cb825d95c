//! Pull-based parallel chunk pipeline.
//!
//! SourceChunker → Dispatcher → (fan-out) Workers → (fan-in) ReorderingSink.
//! All coordination is message passing; the source handle belongs to the
//! dispatcher and the destination handle to the sink.

pub mod cancel;
pub mod chunker;
pub mod core;
pub mod dispatcher;
pub mod io;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod worker;

pub use self::cancel::CancelToken;
pub use self::chunker::{ChunkMode, ChunkSource, SourceChunker};
pub use self::core::{decode_stream, default_workers, encode_stream, run_file, run_pipeline, PipelineConfig};
pub use self::io::{default_output_path, Destination, InputSource, OutputSink};
pub use self::pipeline::{run_chunks, PipelineContext};
pub use self::types::{Chunk, Direction, WorkerId};
