#![forbid(unsafe_code)]

use clap::Parser;
use tracing::{Level as TraceLevel, error};
use tracing_subscriber::FmtSubscriber;

use pkgjson_editor::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let args = Cli::parse();
    if let Err(e) = cli::run(args) {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}
