//! # topo-runner
//!
//! Command-line entry point for the latency topology engine.
//!
//! Loads an optional JSON configuration file, builds the catalog and runs one
//! subcommand: a live monitor session, a historical series, a catalog search
//! or a one-shot export.
//!
//! # Usage
//!
//! ```bash
//! topo-runner --config topo.json live --ticks 3
//! topo-runner history binance aws-us-east-1 --window 7d
//! topo-runner search singapore --limit 3
//! topo-runner export --format csv --out /tmp
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use topo_core::config::{AppConfig, load_config};
use topo_core::search::DEFAULT_SEARCH_LIMIT;
use topo_core::types::TimeWindow;
use tracing::info;

use crate::commands::ExportFormat;

/// Exchange to cloud-region latency topology runner.
#[derive(Parser)]
#[command(name = "topo-runner", about = "Exchange to cloud-region latency topology runner")]
struct Cli {
    /// Configuration file path (JSON). Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output. Overrides `logging.log_path`.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the live monitor and print statistics per snapshot.
    Live {
        /// Stop after this many publications.
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Generate and summarize a historical series for one pair.
    History {
        exchange: String,
        region: String,
        /// 1h, 24h, 7d or 30d.
        #[arg(short, long, default_value = "24h")]
        window: TimeWindow,
    },
    /// Search exchanges and regions.
    Search {
        query: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Export one snapshot.
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file or directory; stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    // 2. Initialize logging
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    topo_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name(), config.log_format())?;

    let catalog = config.build_catalog()?;
    info!(
        "topo-runner starting: config={} exchanges={} regions={}",
        cli.config.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<defaults>".into()),
        catalog.exchanges().len(),
        catalog.regions().len(),
    );

    // 3. Dispatch
    match cli.command {
        Command::Live { ticks } => commands::live(&config, catalog, ticks).await?,
        Command::History { exchange, region, window } => {
            commands::history(&config, &catalog, &exchange, &region, window)?
        }
        Command::Search { query, limit } => commands::run_search(&catalog, &query, limit),
        Command::Export { format, out } => commands::export(&config, catalog, format, out).await?,
    }

    Ok(())
}
