//! Command-line entry point.
//!
//! `insight` with no subcommand serves HTTP; `insight analyze` runs the
//! combined report once and prints it to stdout. Flags override the
//! environment-derived configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::{engines, server};

#[derive(Parser, Debug)]
#[command(name = "insight", version, about = "Business-analytics engine service")]
pub struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// Directory of service-local datasets.
    #[arg(long)]
    pub datasets_dir: Option<PathBuf>,

    /// Shared fallback dataset directory.
    #[arg(long)]
    pub shared_datasets_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API (the default).
    Serve,
    /// Run the combined report once and print it as JSON.
    Analyze,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(addr) = cli.addr {
        config.addr = addr;
    }
    if let Some(dir) = cli.datasets_dir {
        config.data.local_dir = dir;
    }
    if let Some(dir) = cli.shared_datasets_dir {
        config.data.shared_dir = dir;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run_server(config).await,
        Command::Analyze => {
            let data = config.data;
            let report = tokio::task::spawn_blocking(move || engines::run_analysis(&data)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
