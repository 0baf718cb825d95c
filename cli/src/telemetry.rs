//! Console logging for the `chunkpipe` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a verbosity level; `RUST_LOG` wins when set.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber. Logs go to stderr so `--json` output
/// on stdout stays machine readable.
pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(verbose).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
