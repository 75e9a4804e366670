//! DDL statement model.
//!
//! Statements are plain data; [`SqlWriter`](crate::sql_writer::SqlWriter)
//! renders them and a [`StoreClient`](crate::client::StoreClient) executes
//! them.

use crate::types::StoreType;
use std::fmt;

/// Database-qualified table or view name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName {
    pub database: String,
    pub name: String,
}

impl TableName {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.name)
    }
}

/// Column of a `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub store_type: StoreType,
}

/// Table engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    /// Keeps the row with the greatest `version` per ordering key on merge
    ReplacingMergeTree { version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: TableName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub engine: Engine,
    pub order_by: Vec<String>,
}

/// Aliased table in a view query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub table: TableName,
    pub alias: String,
}

/// `alias.column` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub source: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(source: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            column: column.into(),
        }
    }
}

/// `LEFT JOIN source ON left = right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub source: TableSource,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// Selected column with its output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub column: ColumnRef,
    pub alias: String,
}

/// Materialized view fed by inserts into its `from` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedView {
    pub name: TableName,
    pub if_not_exists: bool,
    pub engine: Engine,
    /// Output column names forming the ordering key
    pub order_by: Vec<String>,
    pub from: TableSource,
    pub joins: Vec<JoinClause>,
    pub projections: Vec<Projection>,
    /// Query-level settings as `(name, value)`
    pub settings: Vec<(String, String)>,
}

impl MaterializedView {
    /// Every table the view reads from, the source table first.
    pub fn source_tables(&self) -> impl Iterator<Item = &TableName> {
        std::iter::once(&self.from.table).chain(self.joins.iter().map(|j| &j.source.table))
    }

    /// Output column names in projection order.
    pub fn output_columns(&self) -> impl Iterator<Item = &str> {
        self.projections.iter().map(|p| p.alias.as_str())
    }
}

/// A DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    DropTable { table: TableName, if_exists: bool },
    CreateTable(CreateTable),
    CreateMaterializedView(MaterializedView),
}

impl Statement {
    /// Object the statement acts on.
    pub fn target(&self) -> &TableName {
        match self {
            Self::DropTable { table, .. } => table,
            Self::CreateTable(create) => &create.table,
            Self::CreateMaterializedView(view) => &view.name,
        }
    }
}
