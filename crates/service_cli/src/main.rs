//! risk-loader CLI
//!
//! Entry point for provisioning the risk warehouse and loading synthetic
//! data into it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use service_cli::commands;
use service_cli::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Risk warehouse loader
#[derive(Parser)]
#[command(name = "risk-loader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision tables and load synthetic data (default)
    Load {
        /// Number of trades to generate
        #[arg(short, long)]
        trades: Option<usize>,

        /// Risk rows per trade
        #[arg(short, long)]
        risks_per_trade: Option<usize>,

        /// Keep existing tables and rows instead of dropping them
        #[arg(short, long)]
        keep_existing: bool,

        /// Seed for repeatable data
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Recreate the risk materialized view
    View,

    /// Print the DDL of every table and the view without connecting
    Ddl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LoaderConfig::load_with_env_and_validate(&cli.config)?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command.unwrap_or(Commands::Load {
        trades: None,
        risks_per_trade: None,
        keep_existing: false,
        seed: None,
    }) {
        Commands::Load {
            trades,
            risks_per_trade,
            keep_existing,
            seed,
        } => {
            let options = LoadOptions {
                trades,
                risks_per_trade,
                keep_existing,
                seed,
            };
            commands::load::run(&config, &options)?;
        }
        Commands::View => commands::view::run(&config)?,
        Commands::Ddl => commands::ddl::run(&config)?,
    }
    Ok(())
}
