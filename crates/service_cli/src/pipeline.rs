//! The load run: provision tables, create the view, generate and write.
//!
//! Each batch is written right after it is generated. The first failure
//! aborts the run; tables already written are left as they are.

use crate::config::GenerationConfig;
use crate::Result;
use infra_store::batch::Batch;
use infra_store::client::StoreClient;
use infra_store::ddl::TableName;
use infra_store::entities::ALL;
use infra_store::provision::TableProvisioner;
use infra_store::registry::TypeRegistry;
use infra_store::schema::EntitySchema;
use infra_store::views::{recreate_view, risk_view, ViewSources, RISK_VIEW};
use infra_store::writer::BatchWriter;
use infra_synthetic::generator::SyntheticGenerator;
use infra_synthetic::trades::TradeReferences;
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

/// Load pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// Dropping and creating entity tables
    Provisioning,
    /// Recreating the risk materialized view
    CreatingView,
    Books,
    Counterparties,
    Instruments,
    Trades,
    Risk,
    RiskMv,
    PnlEod,
}

impl LoadStep {
    /// Get the step name for display
    pub fn name(&self) -> &'static str {
        match self {
            Self::Provisioning => "Provisioning tables",
            Self::CreatingView => "Creating view",
            Self::Books => "Books",
            Self::Counterparties => "Counterparties",
            Self::Instruments => "Instruments",
            Self::Trades => "Trades",
            Self::Risk => "Risk",
            Self::RiskMv => "Risk MV",
            Self::PnlEod => "PnL EOD",
        }
    }
}

/// Outcome of a completed load run.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Tables provisioned
    pub tables: usize,
    /// Whether the risk view was recreated
    pub view_created: bool,
    /// Rows written per generation step, in write order
    pub rows: Vec<(LoadStep, usize)>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl LoadReport {
    /// Rows written by `step`, if it ran.
    pub fn rows_for(&self, step: LoadStep) -> Option<usize> {
        self.rows
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, rows)| *rows)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|(_, rows)| rows).sum()
    }
}

/// Provisions, generates and writes one load run against `client`.
pub struct LoadPipeline<'a, C: StoreClient> {
    client: &'a C,
    registry: &'a TypeRegistry,
    database: String,
    generation: GenerationConfig,
}

impl<'a, C: StoreClient> LoadPipeline<'a, C> {
    pub fn new(
        client: &'a C,
        registry: &'a TypeRegistry,
        database: &str,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            client,
            registry,
            database: database.to_string(),
            generation,
        }
    }

    /// Table an entity is written to.
    pub fn table(&self, entity: &EntitySchema) -> TableName {
        TableName::new(&self.database, entity.default_table)
    }

    /// Provision every entity table. Returns the number of tables.
    pub fn provision(&self) -> Result<usize> {
        let provisioner = TableProvisioner::new(self.client, self.registry);
        for entity in ALL {
            provisioner.provision(
                entity,
                &self.table(entity),
                self.generation.drop_existing,
                None,
            )?;
        }
        Ok(ALL.len())
    }

    /// Drop and recreate the risk materialized view.
    pub fn create_view(&self) -> Result<()> {
        let view = risk_view(
            TableName::new(&self.database, RISK_VIEW),
            &ViewSources::in_database(&self.database),
        );
        recreate_view(self.client, &view)?;
        Ok(())
    }

    fn write(&self, batch: &Batch) -> Result<usize> {
        let table = self.table(batch.entity());
        Ok(BatchWriter::new(self.client).write(batch, &table)?)
    }

    /// Run the whole load.
    ///
    /// `progress` is called after every step with the number of tables or
    /// rows that step produced.
    pub fn run<R: Rng>(
        &self,
        generator: &mut SyntheticGenerator<'_, R>,
        progress: &mut dyn FnMut(LoadStep, usize),
    ) -> Result<LoadReport> {
        let started = Instant::now();
        let mut report = LoadReport::default();
        let generation = &self.generation;

        report.tables = self.provision()?;
        progress(LoadStep::Provisioning, report.tables);

        if generation.create_view {
            self.create_view()?;
            report.view_created = true;
            progress(LoadStep::CreatingView, 1);
        }

        let mut record = |report: &mut LoadReport, step: LoadStep, rows: usize| {
            debug!(step = step.name(), rows, "step finished");
            progress(step, rows);
            report.rows.push((step, rows));
        };

        let books = generator.books(generation.books)?;
        record(&mut report, LoadStep::Books, self.write(&books)?);

        let counterparties = generator.counterparties(generation.counterparties)?;
        record(&mut report, LoadStep::Counterparties, self.write(&counterparties)?);

        let instruments = generator.instruments(generation.instruments)?;
        record(&mut report, LoadStep::Instruments, self.write(&instruments)?);

        let refs = TradeReferences::new(&counterparties, &instruments, &books);
        let trades = generator.trades(generation.trades, refs)?;
        record(&mut report, LoadStep::Trades, self.write(&trades)?);

        let risks = generator.risks(&trades, generation.risks_per_trade)?;
        record(&mut report, LoadStep::Risk, self.write(&risks)?);

        let risk_mv = generator.risk_mv(&trades, generation.risks_per_trade)?;
        record(&mut report, LoadStep::RiskMv, self.write(&risk_mv)?);

        let pnl = generator.pnl_eod(&trades)?;
        record(&mut report, LoadStep::PnlEod, self.write(&pnl)?);

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            tables = report.tables,
            rows = report.total_rows(),
            duration_ms = report.duration_ms,
            "load complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(LoadStep::RiskMv.name(), "Risk MV");
        assert_eq!(LoadStep::Provisioning.name(), "Provisioning tables");
    }

    #[test]
    fn test_report_totals() {
        let report = LoadReport {
            rows: vec![(LoadStep::Books, 10), (LoadStep::Trades, 100)],
            ..LoadReport::default()
        };
        assert_eq!(report.total_rows(), 110);
        assert_eq!(report.rows_for(LoadStep::Trades), Some(100));
        assert_eq!(report.rows_for(LoadStep::Risk), None);
    }
}
