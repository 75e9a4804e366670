//! In-memory store.
//!
//! Implements [`StoreClient`] with the table semantics the loader relies on:
//! drop/create with `IF [NOT] EXISTS`, Arrow stream inserts checked against
//! the column types, and `FINAL`-style reads that keep the newest row per
//! ordering key. Materialized views are recorded and checked against their
//! sources but not populated.

use crate::batch::column_values;
use crate::client::StoreClient;
use crate::ddl::{ColumnDef, CreateTable, Engine, MaterializedView, Statement, TableName};
use crate::error::{StoreError, StoreResult};
use crate::ipc;
use crate::sql_writer::{ClickHouseWriter, SqlWriter};
use crate::value::Value;
use arrow::record_batch::RecordBatch;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct MemTable {
    columns: Vec<ColumnDef>,
    engine: Engine,
    order_by: Vec<String>,
    batches: Vec<RecordBatch>,
}

impl MemTable {
    fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn row_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

#[derive(Debug, Clone)]
enum MemObject {
    Table(MemTable),
    View(MaterializedView),
}

/// One row as `column -> value`.
pub type Row = BTreeMap<String, Value>;

/// Store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<TableName, MemObject>>,
    log: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL of every statement executed, in order. Inserts are logged as
    /// their `INSERT` line.
    pub fn executed(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn exists(&self, name: &TableName) -> bool {
        self.objects.borrow().contains_key(name)
    }

    pub fn is_view(&self, name: &TableName) -> bool {
        matches!(self.objects.borrow().get(name), Some(MemObject::View(_)))
    }

    /// Definition of a materialized view.
    pub fn view(&self, name: &TableName) -> Option<MaterializedView> {
        match self.objects.borrow().get(name) {
            Some(MemObject::View(view)) => Some(view.clone()),
            _ => None,
        }
    }

    /// Column definitions of a table.
    pub fn columns(&self, table: &TableName) -> StoreResult<Vec<ColumnDef>> {
        self.with_table(table, |t| t.columns.clone())
    }

    /// Total rows inserted, before deduplication.
    pub fn row_count(&self, table: &TableName) -> StoreResult<usize> {
        self.with_table(table, MemTable::row_count)
    }

    /// Every value of one column in insertion order.
    pub fn column_values(&self, table: &TableName, column: &str) -> StoreResult<Vec<Value>> {
        let batches = self.with_table(table, |t| t.batches.clone())?;
        let mut values = Vec::new();
        for batch in &batches {
            let array = batch
                .column_by_name(column)
                .ok_or_else(|| StoreError::Insert {
                    table: table.clone(),
                    message: format!("no column '{}'", column),
                })?;
            values.extend(column_values(column, array.as_ref())?);
        }
        Ok(values)
    }

    /// Rows as a `SELECT ... FINAL` would return them: one row per ordering
    /// key, the one with the greatest version. On equal versions the later
    /// insert wins. Rows come back sorted by ordering key.
    pub fn final_rows(&self, table: &TableName) -> StoreResult<Vec<Row>> {
        let (order_by, version, batches) = self.with_table(table, |t| {
            let Engine::ReplacingMergeTree { version } = &t.engine;
            (t.order_by.clone(), version.clone(), t.batches.clone())
        })?;

        let mut latest: BTreeMap<Vec<String>, Row> = BTreeMap::new();
        for row in Self::rows(&batches)? {
            let key: Vec<String> = order_by
                .iter()
                .map(|k| row.get(k).map(Value::to_string).unwrap_or_default())
                .collect();
            let replace = match latest.get(&key) {
                None => true,
                Some(current) => {
                    let ordering = match (row.get(&version), current.get(&version)) {
                        (Some(new), Some(old)) => new.compare(old),
                        _ => None,
                    };
                    !matches!(ordering, Some(Ordering::Less))
                }
            };
            if replace {
                latest.insert(key, row);
            }
        }
        Ok(latest.into_values().collect())
    }

    fn rows(batches: &[RecordBatch]) -> StoreResult<Vec<Row>> {
        let mut rows = Vec::new();
        for batch in batches {
            let schema = batch.schema();
            let columns = schema
                .fields()
                .iter()
                .zip(batch.columns())
                .map(|(field, array)| {
                    column_values(field.name(), array.as_ref()).map(|v| (field.name().clone(), v))
                })
                .collect::<Result<Vec<_>, _>>()?;
            for i in 0..batch.num_rows() {
                rows.push(
                    columns
                        .iter()
                        .map(|(name, values)| (name.clone(), values[i].clone()))
                        .collect(),
                );
            }
        }
        Ok(rows)
    }

    fn with_table<T>(&self, table: &TableName, f: impl FnOnce(&MemTable) -> T) -> StoreResult<T> {
        match self.objects.borrow().get(table) {
            Some(MemObject::Table(t)) => Ok(f(t)),
            _ => Err(StoreError::UnknownTable(table.clone())),
        }
    }

    fn ddl_error(statement: &Statement, message: impl Into<String>) -> StoreError {
        StoreError::Ddl {
            statement: ClickHouseWriter.render(statement),
            message: message.into(),
        }
    }

    fn create_table(&self, statement: &Statement, create: &CreateTable) -> StoreResult<()> {
        let mut objects = self.objects.borrow_mut();
        if objects.contains_key(&create.table) {
            return if create.if_not_exists {
                Ok(())
            } else {
                Err(Self::ddl_error(
                    statement,
                    format!("Table {} already exists", create.table),
                ))
            };
        }
        let known = |name: &str| create.columns.iter().any(|c| c.name == name);
        let Engine::ReplacingMergeTree { version } = &create.engine;
        if let Some(missing) = std::iter::once(version)
            .chain(&create.order_by)
            .find(|name| !known(name.as_str()))
        {
            return Err(Self::ddl_error(
                statement,
                format!("Missing columns: '{}'", missing),
            ));
        }
        objects.insert(
            create.table.clone(),
            MemObject::Table(MemTable {
                columns: create.columns.clone(),
                engine: create.engine.clone(),
                order_by: create.order_by.clone(),
                batches: Vec::new(),
            }),
        );
        Ok(())
    }

    fn create_view(&self, statement: &Statement, view: &MaterializedView) -> StoreResult<()> {
        let mut objects = self.objects.borrow_mut();
        if objects.contains_key(&view.name) {
            return if view.if_not_exists {
                Ok(())
            } else {
                Err(Self::ddl_error(
                    statement,
                    format!("Table {} already exists", view.name),
                ))
            };
        }

        let mut aliases: HashMap<&str, &MemTable> = HashMap::new();
        let sources =
            std::iter::once(&view.from).chain(view.joins.iter().map(|join| &join.source));
        for source in sources {
            match objects.get(&source.table) {
                Some(MemObject::Table(table)) => {
                    aliases.insert(source.alias.as_str(), table);
                }
                _ => {
                    return Err(Self::ddl_error(
                        statement,
                        format!("Table {} does not exist", source.table),
                    ))
                }
            }
        }

        let references = view
            .projections
            .iter()
            .map(|p| &p.column)
            .chain(view.joins.iter().flat_map(|j| [&j.left, &j.right]));
        for column in references {
            let found = aliases
                .get(column.source.as_str())
                .is_some_and(|table| table.column(&column.column).is_some());
            if !found {
                return Err(Self::ddl_error(
                    statement,
                    format!("Unknown identifier {}.{}", column.source, column.column),
                ));
            }
        }

        let Engine::ReplacingMergeTree { version } = &view.engine;
        let outputs: Vec<&str> = view.output_columns().collect();
        if let Some(missing) = std::iter::once(version)
            .chain(&view.order_by)
            .find(|name| !outputs.contains(&name.as_str()))
        {
            return Err(Self::ddl_error(
                statement,
                format!("Missing columns: '{}'", missing),
            ));
        }

        drop(aliases);
        objects.insert(view.name.clone(), MemObject::View(view.clone()));
        Ok(())
    }

    fn check_batch(
        table_name: &TableName,
        table: &MemTable,
        batch: &RecordBatch,
    ) -> StoreResult<()> {
        let insert_error = |message: String| StoreError::Insert {
            table: table_name.clone(),
            message,
        };
        let schema = batch.schema();
        if schema.fields().len() != table.columns.len() {
            return Err(insert_error(format!(
                "expected {} columns, got {}",
                table.columns.len(),
                schema.fields().len()
            )));
        }
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let column = table
                .column(field.name())
                .ok_or_else(|| insert_error(format!("no such column '{}'", field.name())))?;
            if !column.store_type.accepts(field.data_type()) {
                return Err(insert_error(format!(
                    "column '{}' of type {} cannot hold {}",
                    column.name,
                    column.store_type,
                    field.data_type()
                )));
            }
            if !column.store_type.is_nullable() && array.null_count() > 0 {
                return Err(insert_error(format!(
                    "NULL in non-nullable column '{}'",
                    column.name
                )));
            }
        }
        Ok(())
    }
}

impl StoreClient for MemoryStore {
    fn execute(&self, statement: &Statement) -> StoreResult<()> {
        self.log.borrow_mut().push(ClickHouseWriter.render(statement));
        match statement {
            Statement::DropTable { table, if_exists } => {
                let removed = self.objects.borrow_mut().remove(table);
                if removed.is_none() && !if_exists {
                    return Err(Self::ddl_error(
                        statement,
                        format!("Table {} does not exist", table),
                    ));
                }
                Ok(())
            }
            Statement::CreateTable(create) => self.create_table(statement, create),
            Statement::CreateMaterializedView(view) => self.create_view(statement, view),
        }
    }

    fn insert_arrow(&self, table: &TableName, stream: Vec<u8>) -> StoreResult<()> {
        let mut sql = String::new();
        ClickHouseWriter.write_insert_arrow(&mut sql, table);
        self.log.borrow_mut().push(sql);

        let batches = ipc::decode(&stream).map_err(|e| StoreError::Insert {
            table: table.clone(),
            message: e.to_string(),
        })?;
        let mut objects = self.objects.borrow_mut();
        let target = match objects.get_mut(table) {
            Some(MemObject::Table(t)) => t,
            _ => return Err(StoreError::UnknownTable(table.clone())),
        };
        for batch in &batches {
            Self::check_batch(table, target, batch)?;
        }
        target.batches.extend(batches);
        Ok(())
    }
}
