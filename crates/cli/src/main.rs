//! Folio CLI - investment portfolio client

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Command-line client for the Folio investment API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (defaults to <config dir>/folio/config.toml)
    #[arg(short = 'c', long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into(), cli.log_json)?;

    debug!("starting folio cli");

    let execution = cli.command.execute(cli.config);

    if cli.timeout == 0 {
        if let Err(e) = execution.await {
            error!("command failed: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    } else {
        match tokio::time::timeout(Duration::from_secs(cli.timeout), execution).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("command failed: {e:#}");
                eprintln!("error: {e:#}");
                std::process::exit(1);
            }
            Err(_) => {
                error!("command timed out after {} seconds", cli.timeout);
                eprintln!("error: timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
