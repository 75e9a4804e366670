//! View command implementation
//!
//! Recreates the risk materialized view without touching any table.

use infra_store::http::ClickHouseClient;
use infra_store::registry::TypeRegistry;
use tracing::info;

use crate::config::LoaderConfig;
use crate::pipeline::LoadPipeline;
use crate::Result;

/// Run the view command
pub fn run(config: &LoaderConfig) -> Result<()> {
    let client = ClickHouseClient::connect(&config.store)?;
    let registry = TypeRegistry::new();
    let pipeline = LoadPipeline::new(
        &client,
        &registry,
        &config.store.database,
        config.generation.clone(),
    );

    pipeline.create_view()?;
    info!(database = %config.store.database, "risk view recreated");
    println!("[View] Recreated {}.{}", config.store.database, infra_store::views::RISK_VIEW);
    Ok(())
}
