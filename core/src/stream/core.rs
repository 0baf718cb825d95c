//! Stable public API: configuration and entry points.

use std::path::PathBuf;

use tracing::debug;

use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_READ_BUFFER, DEFAULT_ROWS_THOUSANDS, DEFAULT_TRANSFORM, MAX_BLOCK_SIZE, MAX_WORKERS,
    ROWS_PER_THOUSAND,
};
use crate::stream::cancel::CancelToken;
use crate::stream::chunker::{ChunkMode, SourceChunker};
use crate::stream::io::{default_output_path, open_input, open_output, InputSource, OutputSink};
use crate::stream::pipeline::{run_chunks, PipelineContext};
use crate::stream::types::Direction;
use crate::telemetry::PipelineReport;
use crate::transform::registry;
use crate::types::StreamError;

/// Construction parameters for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub direction: Direction,
    /// Registry name of the transform.
    pub transform: String,
    /// Bytes per chunk in the encode direction.
    pub block_size: usize,
    /// Records per chunk in the decode direction.
    pub rows_per_chunk: usize,
    /// Worker count N.
    pub workers: usize,
    /// Read-ahead buffer in front of the source.
    pub read_buffer: usize,
}

impl PipelineConfig {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            transform: DEFAULT_TRANSFORM.to_string(),
            block_size: DEFAULT_BLOCK_SIZE,
            rows_per_chunk: DEFAULT_ROWS_THOUSANDS * ROWS_PER_THOUSAND,
            workers: default_workers(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    pub fn encode() -> Self {
        Self::new(Direction::Encode)
    }

    pub fn decode() -> Self {
        Self::new(Direction::Decode)
    }

    pub fn with_transform(mut self, name: impl Into<String>) -> Self {
        self.transform = name.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes;
        self
    }

    /// Decode-direction chunk size in thousands of records.
    pub fn with_rows_thousands(mut self, thousands: usize) -> Self {
        self.rows_per_chunk = thousands.saturating_mul(ROWS_PER_THOUSAND);
        self
    }

    /// Decode-direction chunk size in records.
    pub fn with_rows_per_chunk(mut self, records: usize) -> Self {
        self.rows_per_chunk = records;
        self
    }

    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer = bytes;
        self
    }

    pub fn chunk_mode(&self) -> ChunkMode {
        ChunkMode::for_direction(self.direction, self.block_size, self.rows_per_chunk)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(StreamError::Validation(format!(
                "invalid workers count: {}, must be within 1..={MAX_WORKERS}",
                self.workers
            )));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(StreamError::Validation(format!(
                "invalid block size: {}, must be within 1..={MAX_BLOCK_SIZE}",
                self.block_size
            )));
        }
        if self.rows_per_chunk == 0 {
            return Err(StreamError::Validation("rows per chunk must be at least 1".into()));
        }
        if self.read_buffer == 0 {
            return Err(StreamError::Validation("read buffer must be at least 1 byte".into()));
        }
        Ok(())
    }

    /// Validate and resolve the transform.
    pub fn build_context(&self) -> Result<PipelineContext, StreamError> {
        self.validate()?;
        let transform = registry::resolve(&self.transform)?;
        Ok(PipelineContext {
            direction: self.direction,
            transform,
            workers: self.workers,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::encode()
    }
}

/// One worker per core, leaving one core free.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Run a pipeline from a normalized input to a normalized output.
///
/// Unknown transforms and invalid parameters fail before any file is opened.
pub fn run_pipeline(
    input: InputSource,
    output: OutputSink,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, StreamError> {
    let ctx = config.build_context()?;

    let reader = open_input(input, config.read_buffer)?;
    let destination = open_output(output)?;
    let chunker = SourceChunker::new(reader, config.chunk_mode());
    debug!(mode = ?chunker.mode(), "source opened");

    run_chunks(chunker, destination, &ctx, cancel)
}

/// Encode `input` with the configured transform.
pub fn encode_stream(
    input: InputSource,
    output: OutputSink,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, StreamError> {
    let config = PipelineConfig { direction: Direction::Encode, ..config.clone() };
    run_pipeline(input, output, &config, cancel)
}

/// Decode `input` produced by [`encode_stream`] with the same transform.
pub fn decode_stream(
    input: InputSource,
    output: OutputSink,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, StreamError> {
    let config = PipelineConfig { direction: Direction::Decode, ..config.clone() };
    run_pipeline(input, output, &config, cancel)
}

/// File-to-file run; the destination defaults to the source path plus `.scoutput`.
pub fn run_file(
    source: PathBuf,
    destination: Option<PathBuf>,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, StreamError> {
    let destination = destination.unwrap_or_else(|| default_output_path(&source));
    run_pipeline(InputSource::File(source), OutputSink::File(destination), config, cancel)
}
