use std::path::PathBuf;

use anyhow::{bail, Context};
use chunkpipe_core::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_ROWS_THOUSANDS, DEFAULT_TRANSFORM, MAX_WORKERS};
use chunkpipe_core::prelude::*;
use chunkpipe_core::stream::{default_output_path, default_workers};
use chunkpipe_core::transform::names;
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Split the source into blocks and write one encoded line per block.
    Encode,
    /// Read encoded lines back in row groups and restore the original bytes.
    Decode,
}

impl From<Mode> for Direction {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Encode => Direction::Encode,
            Mode::Decode => Direction::Decode,
        }
    }
}

/// Command-line arguments for the `chunkpipe` binary.
///
/// Numeric settings may also come from the environment, which is convenient
/// when the binary runs under a job scheduler.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chunkpipe",
    version,
    about = "Parallel chunked encode/decode of large files, output in source order"
)]
pub struct CliArgs {
    /// Direction of travel.
    #[arg(value_enum)]
    pub mode: Mode,

    /// Source file.
    pub source: PathBuf,

    /// Destination file. Defaults to the source path plus `.scoutput`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Transform applied to every chunk (base64, identity, hex, zstd, deflate).
    #[arg(short, long, default_value_t = String::from(DEFAULT_TRANSFORM))]
    pub transform: String,

    /// Number of worker threads. Defaults to the CPU count minus one.
    ///
    /// Environment variable: `CHUNKPIPE_WORKERS`
    #[arg(short, long, env = "CHUNKPIPE_WORKERS")]
    pub workers: Option<usize>,

    /// Bytes per chunk when encoding.
    ///
    /// Environment variable: `CHUNKPIPE_BLOCK_SIZE`
    #[arg(long, env = "CHUNKPIPE_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Thousands of encoded lines per chunk when decoding.
    #[arg(long = "rows-k", default_value_t = DEFAULT_ROWS_THOUSANDS)]
    pub rows_k: usize,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub pipeline: PipelineConfig,
    pub json: bool,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let workers = args.workers.unwrap_or_else(default_workers);
        if workers == 0 || workers > MAX_WORKERS {
            bail!("--workers ({workers}) must be within 1..={MAX_WORKERS}");
        }

        if !names().contains(&args.transform.as_str()) {
            bail!("unknown transform {:?}, expected one of: {}", args.transform, names().join(", "));
        }

        let destination = args.output.unwrap_or_else(|| default_output_path(&args.source));
        if destination == args.source {
            bail!("destination must differ from the source: {}", destination.display());
        }

        let pipeline = PipelineConfig::new(args.mode.into())
            .with_transform(args.transform)
            .with_workers(workers)
            .with_block_size(args.block_size)
            .with_rows_thousands(args.rows_k);
        pipeline.validate().context("invalid pipeline settings")?;

        Ok(Self { source: args.source, destination, pipeline, json: args.json })
    }
}
