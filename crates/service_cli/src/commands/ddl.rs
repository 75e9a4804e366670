//! DDL command implementation
//!
//! Renders every statement a load run would send, without connecting.

use infra_store::ddl::{Statement, TableName};
use infra_store::entities::ALL;
use infra_store::provision::create_table_statement;
use infra_store::registry::TypeRegistry;
use infra_store::sql_writer::{ClickHouseWriter, SqlWriter};
use infra_store::views::{risk_view, ViewSources, RISK_VIEW};

use crate::config::LoaderConfig;
use crate::Result;

/// Statements of a load run, in execution order.
pub fn statements(config: &LoaderConfig) -> Result<Vec<Statement>> {
    let registry = TypeRegistry::new();
    let database = &config.store.database;
    let mut statements = Vec::new();

    for entity in ALL {
        let table = TableName::new(database, entity.default_table);
        if config.generation.drop_existing {
            statements.push(Statement::DropTable {
                table: table.clone(),
                if_exists: true,
            });
        }
        statements.push(create_table_statement(&registry, entity, &table, None)?);
    }

    if config.generation.create_view {
        let view = risk_view(
            TableName::new(database, RISK_VIEW),
            &ViewSources::in_database(database),
        );
        statements.push(Statement::DropTable {
            table: view.name.clone(),
            if_exists: true,
        });
        statements.push(Statement::CreateMaterializedView(view));
    }
    Ok(statements)
}

/// Run the ddl command
pub fn run(config: &LoaderConfig) -> Result<()> {
    for statement in statements(config)? {
        println!("{};\n", ClickHouseWriter.render(&statement));
    }
    Ok(())
}
