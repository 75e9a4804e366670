//! Load command implementation
//!
//! Provisions every table, recreates the risk view and loads a fresh set of
//! synthetic books, counterparties, instruments, trades and risk.

use infra_store::http::ClickHouseClient;
use infra_store::registry::TypeRegistry;
use infra_synthetic::generator::{Clock, SyntheticGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::LoaderConfig;
use crate::pipeline::{LoadPipeline, LoadReport};
use crate::{CliError, Result};

/// Command-line overrides for a load run.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Number of trades
    pub trades: Option<usize>,
    /// Risk rows per trade
    pub risks_per_trade: Option<usize>,
    /// Keep existing tables and their rows
    pub keep_existing: bool,
    /// Seed for repeatable output
    pub seed: Option<u64>,
}

/// Apply `options` on top of the configured volumes.
pub fn apply_options(config: &mut LoaderConfig, options: &LoadOptions) -> Result<()> {
    if let Some(trades) = options.trades {
        config.generation.trades = trades;
    }
    if let Some(risks_per_trade) = options.risks_per_trade {
        if risks_per_trade == 0 {
            return Err(CliError::InvalidArgument(
                "--risks-per-trade must be at least 1".to_string(),
            ));
        }
        config.generation.risks_per_trade = risks_per_trade;
    }
    if options.keep_existing {
        config.generation.drop_existing = false;
    }
    Ok(())
}

/// Run the load command
pub fn run(config: &LoaderConfig, options: &LoadOptions) -> Result<LoadReport> {
    let mut config = config.clone();
    apply_options(&mut config, options)?;

    info!("Starting load...");
    info!("  Store: {}", config.store.endpoint());
    info!("  Database: {}", config.store.database);

    let client = ClickHouseClient::connect(&config.store)?;
    let registry = TypeRegistry::new();
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut generator = SyntheticGenerator::with_rng(&registry, rng, Clock::system());

    let pipeline = LoadPipeline::new(
        &client,
        &registry,
        &config.store.database,
        config.generation.clone(),
    );
    let report = pipeline.run(&mut generator, &mut |step, count| {
        println!("[Load] {}: {}", step.name(), count);
    })?;

    println!(
        "[Load] Done: {} tables, {} rows in {} ms",
        report.tables,
        report.total_rows(),
        report.duration_ms
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_override_generation() {
        let mut config = LoaderConfig::default();
        let options = LoadOptions {
            trades: Some(5),
            risks_per_trade: Some(3),
            keep_existing: true,
            seed: Some(1),
        };
        apply_options(&mut config, &options).unwrap();
        assert_eq!(config.generation.trades, 5);
        assert_eq!(config.generation.risks_per_trade, 3);
        assert!(!config.generation.drop_existing);
    }

    #[test]
    fn test_zero_risks_per_trade_rejected() {
        let mut config = LoaderConfig::default();
        let options = LoadOptions {
            risks_per_trade: Some(0),
            ..LoadOptions::default()
        };
        assert!(matches!(
            apply_options(&mut config, &options),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
