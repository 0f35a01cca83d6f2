//! searchlens - command line front end for the searchlens dashboard.
//!
//! Logs in or registers against the searchlens API, keeps the bearer token
//! between runs and shows the stored analysis input.

mod app;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use searchlens_core::Config;

/// Log file prefix inside the data directory
const LOG_FILE_PREFIX: &str = "searchlens.log";

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load();
    let log_dir = config.as_ref().ok().and_then(|c| c.data_dir().ok());
    let _guard = init_tracing(log_dir);

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            let mut c = Config::default();
            c.apply_env();
            c
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let app = App::new(config)?;
    info!(command = args.first().map(String::as_str).unwrap_or("help"), "searchlens starting");

    if let Some(notice) = app.startup_notice() {
        eprintln!("{}", notice);
    }

    if args.first().map(String::as_str) == Some("shell") {
        return app.shell().await;
    }

    app.run_command(&args).await?;
    Ok(())
}
