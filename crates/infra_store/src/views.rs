//! The denormalized risk view.
//!
//! `risk_f_mv` is fed by inserts into the risk table and left-joins each
//! risk row to its trade, counterparty, collateral instrument and book.
//! Column names follow these rules:
//! - `asOfDate` and `id` come from the risk row.
//! - Risk and trade fields keep their names, except `jobId`, `snapId` and
//!   `tradeId` on the risk side (`risk_` prefix) and `jobId`, `snapId` and
//!   `status` on the trade side (`trade_` prefix).
//! - Bookkeeping columns (`updatedAt`, `portfolio`, `collatNotional`) and
//!   trade fields already copied onto the risk row are not selected.
//! - Counterparty, instrument and book fields are prefixed with
//!   `counterparty_`, `instrument_` and `hmsbook_`. Join keys already on the
//!   risk or trade row are left out.

use crate::client::StoreClient;
use crate::ddl::{
    ColumnRef, Engine, JoinClause, MaterializedView, Projection, Statement, TableName,
    TableSource,
};
use crate::entities::{COUNTERPARTY, HMS_BOOK, INSTRUMENT, RISK, TRADE};
use crate::error::StoreResult;
use crate::schema::EntitySchema;
use tracing::info;

/// Default view name.
pub const RISK_VIEW: &str = "risk_f_mv";

const KEY_FIELDS: [&str; 2] = ["asOfDate", "id"];
const RISK_SKIPPED: [&str; 1] = ["updatedAt"];
const RISK_PREFIXED: [&str; 3] = ["jobId", "snapId", "tradeId"];
const TRADE_SKIPPED: [&str; 5] = [
    "portfolio",
    "counterParty",
    "collatId",
    "collatDesc",
    "collatNotional",
];
const TRADE_PREFIXED: [&str; 3] = ["jobId", "snapId", "status"];

/// Tables the risk view reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSources {
    pub risk: TableName,
    pub trade: TableName,
    pub counterparty: TableName,
    pub instrument: TableName,
    pub book: TableName,
}

impl ViewSources {
    /// Default entity tables in `database`.
    pub fn in_database(database: &str) -> Self {
        let table = |entity: &EntitySchema| TableName::new(database, entity.default_table);
        Self {
            risk: table(&RISK),
            trade: table(&TRADE),
            counterparty: table(&COUNTERPARTY),
            instrument: table(&INSTRUMENT),
            book: table(&HMS_BOOK),
        }
    }
}

fn source(table: &TableName, alias: &str) -> TableSource {
    TableSource {
        table: table.clone(),
        alias: alias.to_string(),
    }
}

fn project(alias: &str, column: &str, name: String) -> Projection {
    Projection {
        column: ColumnRef::new(alias, column),
        alias: name,
    }
}

fn renamed(prefix: &str, prefixed: &[&str], field: &str) -> String {
    if prefixed.contains(&field) {
        format!("{}_{}", prefix, field)
    } else {
        field.to_string()
    }
}

/// Definition of the risk view named `name` over `sources`.
pub fn risk_view(name: TableName, sources: &ViewSources) -> MaterializedView {
    let mut projections: Vec<Projection> = KEY_FIELDS
        .iter()
        .map(|f| project("r", f, f.to_string()))
        .collect();
    for field in RISK
        .field_names()
        .filter(|f| !KEY_FIELDS.contains(f) && !RISK_SKIPPED.contains(f))
    {
        projections.push(project("r", field, renamed("risk", &RISK_PREFIXED, field)));
    }
    for field in TRADE
        .field_names()
        .filter(|f| !KEY_FIELDS.contains(f) && !TRADE_SKIPPED.contains(f))
    {
        projections.push(project("t", field, renamed("trade", &TRADE_PREFIXED, field)));
    }
    projections.extend(
        COUNTERPARTY
            .field_names()
            .map(|f| project("cp", f, format!("counterparty_{}", f))),
    );
    projections.extend(
        INSTRUMENT
            .field_names()
            .filter(|f| *f != "id")
            .map(|f| project("i", f, format!("instrument_{}", f))),
    );
    projections.extend(
        HMS_BOOK
            .field_names()
            .filter(|f| *f != "name")
            .map(|f| project("h", f, format!("hmsbook_{}", f))),
    );

    let join = |table: &TableName, alias: &str, left: ColumnRef, column: &str| JoinClause {
        source: source(table, alias),
        left,
        right: ColumnRef::new(alias, column),
    };

    MaterializedView {
        name,
        if_not_exists: false,
        engine: Engine::ReplacingMergeTree {
            version: RISK.discriminant.to_string(),
        },
        order_by: KEY_FIELDS.iter().map(|f| f.to_string()).collect(),
        from: source(&sources.risk, "r"),
        joins: vec![
            join(&sources.trade, "t", ColumnRef::new("r", "id"), "id"),
            join(
                &sources.counterparty,
                "cp",
                ColumnRef::new("r", "counterParty"),
                "name",
            ),
            join(
                &sources.instrument,
                "i",
                ColumnRef::new("r", "collatId"),
                "id",
            ),
            join(&sources.book, "h", ColumnRef::new("t", "hmsBook"), "name"),
        ],
        projections,
        settings: vec![("join_use_nulls".to_string(), "1".to_string())],
    }
}

/// Drop the view if present and create it again.
pub fn recreate_view<C: StoreClient>(client: &C, view: &MaterializedView) -> StoreResult<()> {
    client.execute(&Statement::DropTable {
        table: view.name.clone(),
        if_exists: true,
    })?;
    client.execute(&Statement::CreateMaterializedView(view.clone()))?;
    info!(view = %view.name, columns = view.projections.len(), "materialized view created");
    Ok(())
}
