//! fmcsync - sync Firepower Management Center policies and objects to JSON.
//!
//! Fetches access-control rules and network objects through the
//! management REST API, writes them as flat JSON snapshots, and edits
//! dynamic-object mappings.

mod commands;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Directory for an optional daily-rolling log file
const LOG_DIR_ENV: &str = "FMCSYNC_LOG_DIR";

/// Log file prefix inside `FMCSYNC_LOG_DIR`
const LOG_FILE_PREFIX: &str = "fmcsync.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    if command == Command::Help {
        commands::print_usage();
        return Ok(());
    }

    let _guard = init_tracing();
    info!(command = command.name(), "fmcsync starting");

    commands::run(command).await
}
