//! SignalLab CLI — run a backtest from a config file and signal export.
//!
//! `signallab run` loads a TOML run configuration and a JSON alert
//! export, drives the full pipeline against the configured backend
//! services, and writes the report as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use signallab_core::config::{PortfolioSettings, RunParams};
use signallab_core::domain::RawSignal;
use signallab_core::external::calendar::HttpCalendarSource;
use signallab_core::external::engine::HttpExecutionEngine;
use signallab_core::external::lot_size::LotSizeTable;
use signallab_core::external::margin::{ContractInfo, ContractTable, HttpMarginSource};
use signallab_runner::{run_backtest, Collaborators};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "signallab", about = "SignalLab — alert-signal backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest run.
    Run {
        /// Path to the TOML run configuration.
        #[arg(long)]
        config: PathBuf,

        /// Path to the JSON alert export (array of raw signals).
        #[arg(long)]
        signals: PathBuf,

        /// Path to the lot-size reference CSV.
        #[arg(long)]
        lot_sizes: PathBuf,

        /// Output path for the report JSON. Prints to stdout when
        /// omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Top-level TOML run configuration.
#[derive(Debug, Deserialize)]
struct RunFile {
    params: RunParams,
    portfolio: PortfolioSettings,
    engine_url: String,
    calendar_url: String,
    margin_url: String,
    /// Contract metadata for margin pricing, keyed by underlying.
    #[serde(default)]
    contracts: HashMap<String, ContractInfo>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            signals,
            lot_sizes,
            out,
        } => run_cmd(&config, &signals, &lot_sizes, out.as_deref()),
    }
}

fn run_cmd(
    config_path: &Path,
    signals_path: &Path,
    lot_sizes_path: &Path,
    out: Option<&Path>,
) -> Result<()> {
    let config: RunFile = toml::from_str(
        &std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config {}", config_path.display()))?,
    )
    .context("failed to parse run configuration")?;

    let signals: Vec<RawSignal> = serde_json::from_str(
        &std::fs::read_to_string(signals_path)
            .with_context(|| format!("failed to read signals {}", signals_path.display()))?,
    )
    .context("failed to parse signal export")?;
    info!(signals = signals.len(), "loaded signal export");

    let lot_sizes = LotSizeTable::from_csv_path(lot_sizes_path)
        .with_context(|| format!("failed to load lot sizes {}", lot_sizes_path.display()))?;
    let contracts = ContractTable::new(config.contracts);

    let engine = HttpExecutionEngine::new(&config.engine_url)
        .context("failed to build execution engine client")?;
    let calendar = HttpCalendarSource::new(&config.calendar_url)
        .context("failed to build calendar client")?;
    let margin =
        HttpMarginSource::new(&config.margin_url).context("failed to build margin client")?;

    let deps = Collaborators {
        engine: &engine,
        calendar: &calendar,
        margin: &margin,
        lot_sizes: &lot_sizes,
        contracts: &contracts,
    };

    let report = run_backtest(&config.params, &config.portfolio, &signals, &deps)
        .context("backtest run failed")?;

    if report.is_empty() {
        eprintln!("no trades generated");
    }

    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            info!(run_id = %report.run_id, path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
