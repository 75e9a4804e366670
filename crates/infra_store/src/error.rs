//! Store error types.

use crate::batch::BatchError;
use crate::ddl::TableName;
use crate::schema::SchemaError;
use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while provisioning or loading the store.
///
/// Server-side failures keep the server's message verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("cannot connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// A DDL statement was rejected
    #[error("DDL failed: {message}\n{statement}")]
    Ddl { statement: String, message: String },

    /// An insert was rejected
    #[error("insert into {table} failed: {message}")]
    Insert { table: TableName, message: String },

    /// The target table does not exist
    #[error("table {0} does not exist")]
    UnknownTable(TableName),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

pub type StoreResult<T> = Result<T, StoreError>;
