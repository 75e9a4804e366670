//! Columnar batch writer.

use crate::batch::Batch;
use crate::client::StoreClient;
use crate::ddl::TableName;
use crate::error::StoreResult;
use crate::ipc;
use tracing::info;

/// Appends batches to store tables, one insert call per batch.
pub struct BatchWriter<'a, C: StoreClient> {
    client: &'a C,
}

impl<'a, C: StoreClient> BatchWriter<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Encode `batch` as an Arrow IPC stream and insert it into `table`.
    ///
    /// Returns the number of rows written. Nothing is chunked or retried.
    pub fn write(&self, batch: &Batch, table: &TableName) -> StoreResult<usize> {
        let stream = ipc::encode(batch.record_batch())?;
        self.client.insert_arrow(table, stream)?;
        let rows = batch.num_rows();
        info!(entity = batch.entity().name, table = %table, rows, "batch written");
        Ok(rows)
    }
}
