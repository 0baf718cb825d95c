//! `chunkpipe`: encode or decode a file through the parallel chunk pipeline.

mod config;
mod telemetry;

use std::process::ExitCode;
use std::thread;

use anyhow::Context;
use chunkpipe_core::prelude::*;
use clap::Parser;
use config::{CliArgs, RunConfig};
use telemetry::init_tracing;
use tokio::signal;
use tracing::{error, info, warn};

/// Conventional exit status for a run stopped by SIGINT.
const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(err) = init_tracing(args.verbose) {
        eprintln!("failed to initialise logging: {err:#}");
    }

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::try_from(args)?;
    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        direction = %config.pipeline.direction,
        transform = %config.pipeline.transform,
        workers = config.pipeline.workers,
        "starting"
    );

    let cancel = CancelToken::new();
    watch_interrupt(cancel.clone())?;

    let report = run_file(config.source.clone(), Some(config.destination.clone()), &config.pipeline, &cancel)
        .with_context(|| format!("{} of {} failed", config.pipeline.direction, config.source.display()))?;

    if config.json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&config, &report);
    }

    match report.outcome {
        Outcome::Complete => Ok(ExitCode::SUCCESS),
        Outcome::Cancelled => Ok(ExitCode::from(EXIT_CANCELLED)),
    }
}

/// Turn Ctrl+C into a cancel request. The pipeline itself stays synchronous;
/// a single-threaded runtime on a side thread only waits for the signal.
fn watch_interrupt(cancel: CancelToken) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    thread::Builder::new()
        .name("signal".into())
        .spawn(move || {
            runtime.block_on(async {
                match signal::ctrl_c().await {
                    Ok(()) => {
                        warn!("received Ctrl+C, finishing in-flight chunks");
                        cancel.cancel();
                    }
                    Err(e) => warn!(error = %e, "could not install Ctrl+C handler"),
                }
            });
        })
        .context("failed to spawn signal thread")?;
    Ok(())
}

fn print_summary(config: &RunConfig, report: &PipelineReport) {
    match report.outcome {
        Outcome::Complete => println!("wrote {}", config.destination.display()),
        Outcome::Cancelled => match &report.partial_path {
            Some(part) => println!("cancelled, partial output kept at {}", part.display()),
            None => println!("cancelled"),
        },
    }
    println!(
        "  chunks {}/{}  in {} B  out {} B  workers {}  peak in flight {}",
        report.chunks_committed,
        report.chunks_read,
        report.bytes_in,
        report.bytes_out,
        report.workers,
        report.peak_in_flight,
    );
    println!(
        "  {:.2?}  {:.1} MiB/s  {}",
        report.elapsed,
        report.throughput_bytes_per_sec / (1024.0 * 1024.0),
        report.stage_times.summary(),
    );
}
