//! # infra_store
//!
//! Columnar store plumbing for the risk loader.
//!
//! - [`registry`]: abstract field types to store and Arrow types
//! - [`schema`] / [`entities`]: static entity declarations
//! - [`batch`] / [`ipc`]: Arrow record batches and their wire encoding
//! - [`ddl`] / [`sql_writer`]: DDL statements and their ClickHouse rendering
//! - [`provision`] / [`writer`] / [`views`]: table creation, batch inserts
//!   and the denormalized risk view
//! - [`client`] / [`http`] / [`memory`]: the store contract, the HTTP client
//!   and an in-memory store
//!
//! ## Example
//!
//! ```
//! use infra_store::prelude::*;
//!
//! let store = MemoryStore::new();
//! let registry = TypeRegistry::new();
//! let table = TableName::new("default", HMS_BOOK.default_table);
//!
//! TableProvisioner::new(&store, &registry)
//!     .provision(&HMS_BOOK, &table, true, None)
//!     .unwrap();
//! assert_eq!(store.row_count(&table).unwrap(), 0);
//! ```

pub mod batch;
pub mod client;
pub mod ddl;
pub mod entities;
pub mod error;
pub mod http;
pub mod ipc;
pub mod memory;
pub mod provision;
pub mod registry;
pub mod schema;
pub mod sql_writer;
pub mod types;
pub mod value;
pub mod views;
pub mod writer;

pub mod prelude {
    pub use crate::batch::{Batch, BatchBuilder, BatchError, Record};
    pub use crate::client::{StoreClient, StoreConfig};
    pub use crate::ddl::{Statement, TableName};
    pub use crate::entities::{COUNTERPARTY, HMS_BOOK, INSTRUMENT, PNL_EOD, RISK, RISK_MV, TRADE};
    pub use crate::error::{StoreError, StoreResult};
    pub use crate::http::ClickHouseClient;
    pub use crate::memory::MemoryStore;
    pub use crate::provision::TableProvisioner;
    pub use crate::registry::TypeRegistry;
    pub use crate::schema::{EntitySchema, FieldDef, SchemaError};
    pub use crate::types::{FieldType, ScalarType, StoreType};
    pub use crate::value::Value;
    pub use crate::views::{recreate_view, risk_view, ViewSources, RISK_VIEW};
    pub use crate::writer::BatchWriter;
}
