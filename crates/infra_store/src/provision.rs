//! Table provisioning.

use crate::client::StoreClient;
use crate::ddl::{ColumnDef, CreateTable, Engine, Statement, TableName};
use crate::error::StoreResult;
use crate::registry::TypeRegistry;
use crate::schema::EntitySchema;
use crate::sql_writer::{ClickHouseWriter, SqlWriter};
use tracing::{debug, info};

/// Creates entity tables with a ReplacingMergeTree engine.
pub struct TableProvisioner<'a, C: StoreClient> {
    client: &'a C,
    registry: &'a TypeRegistry,
}

impl<'a, C: StoreClient> TableProvisioner<'a, C> {
    pub fn new(client: &'a C, registry: &'a TypeRegistry) -> Self {
        Self { client, registry }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for `entity`.
    ///
    /// `order_by` defaults to the entity's own ordering key.
    pub fn create_table_statement(
        &self,
        entity: &EntitySchema,
        table: &TableName,
        order_by: Option<&[&str]>,
    ) -> StoreResult<Statement> {
        create_table_statement(self.registry, entity, table, order_by)
    }

    /// Make sure `table` exists with `entity`'s columns.
    ///
    /// With `drop_existing` the table is dropped first, so it comes back
    /// empty. Without it an existing table and its rows are left as they are.
    /// The ordering key is checked before anything is sent to the store.
    pub fn provision(
        &self,
        entity: &EntitySchema,
        table: &TableName,
        drop_existing: bool,
        order_by: Option<&[&str]>,
    ) -> StoreResult<()> {
        let create = self.create_table_statement(entity, table, order_by)?;

        if drop_existing {
            let drop = Statement::DropTable {
                table: table.clone(),
                if_exists: true,
            };
            debug!(sql = %ClickHouseWriter.render(&drop), "dropping table");
            self.client.execute(&drop)?;
        }

        debug!(sql = %ClickHouseWriter.render(&create), "creating table");
        self.client.execute(&create)?;
        info!(entity = entity.name, table = %table, "table provisioned");
        Ok(())
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for `entity`, without a client.
pub fn create_table_statement(
    registry: &TypeRegistry,
    entity: &EntitySchema,
    table: &TableName,
    order_by: Option<&[&str]>,
) -> StoreResult<Statement> {
    let order_by = order_by.unwrap_or(entity.order_by);
    entity.check_order_by(order_by)?;
    let columns = entity
        .store_columns(registry)
        .into_iter()
        .map(|(name, store_type)| ColumnDef {
            name: name.to_string(),
            store_type,
        })
        .collect();
    Ok(Statement::CreateTable(CreateTable {
        table: table.clone(),
        if_not_exists: true,
        columns,
        engine: Engine::ReplacingMergeTree {
            version: entity.discriminant.to_string(),
        },
        order_by: order_by.iter().map(|k| k.to_string()).collect(),
    }))
}
