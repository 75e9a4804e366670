//! Provisioning and writing against the in-memory store.

use chrono::NaiveDate;
use infra_store::batch::Record;
use infra_store::ddl::Statement;
use infra_store::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn trade(id: i64, version: i64, notional: Option<&str>) -> Record {
    Record::new()
        .with("asOfDate", as_of())
        .with("id", id)
        .with("version", version)
        .with("tradeId", format!("T{}", id))
        .with("collatNotional", notional.map(|n| Decimal::from_str(n).unwrap()))
}

fn trades(records: &[Record]) -> Batch {
    Batch::from_records(&TRADE, &TypeRegistry::new(), records).unwrap()
}

/// Client whose DDL always fails with a server message.
struct FailingClient;

impl StoreClient for FailingClient {
    fn execute(&self, statement: &Statement) -> StoreResult<()> {
        Err(StoreError::Ddl {
            statement: format!("{:?}", statement.target()),
            message: "Code: 516. Authentication failed".to_string(),
        })
    }

    fn insert_arrow(&self, _table: &TableName, _stream: Vec<u8>) -> StoreResult<()> {
        unreachable!("no inserts in this test")
    }
}

#[test]
fn test_provision_with_drop_twice_yields_empty_identical_tables() {
    let store = MemoryStore::new();
    let registry = TypeRegistry::new();
    let provisioner = TableProvisioner::new(&store, &registry);
    let table = TableName::new("default", "trades_f");

    provisioner.provision(&TRADE, &table, true, None).unwrap();
    let first = store.columns(&table).unwrap();
    BatchWriter::new(&store)
        .write(&trades(&[trade(1, 1, Some("10.5"))]), &table)
        .unwrap();
    assert_eq!(store.row_count(&table).unwrap(), 1);

    provisioner.provision(&TRADE, &table, true, None).unwrap();
    assert_eq!(store.row_count(&table).unwrap(), 0);
    assert_eq!(store.columns(&table).unwrap(), first);
}

#[test]
fn test_provision_without_drop_keeps_existing_rows() {
    let store = MemoryStore::new();
    let registry = TypeRegistry::new();
    let provisioner = TableProvisioner::new(&store, &registry);
    let table = TableName::new("default", "trades_f");

    provisioner.provision(&TRADE, &table, false, None).unwrap();
    BatchWriter::new(&store)
        .write(&trades(&[trade(1, 1, None), trade(2, 1, None)]), &table)
        .unwrap();

    provisioner.provision(&TRADE, &table, false, None).unwrap();
    assert_eq!(store.row_count(&table).unwrap(), 2);
}

#[test]
fn test_ddl_failure_propagates_unchanged() {
    let registry = TypeRegistry::new();
    let provisioner = TableProvisioner::new(&FailingClient, &registry);
    let err = provisioner
        .provision(&RISK, &TableName::new("default", "risk_f"), true, None)
        .unwrap_err();
    match err {
        StoreError::Ddl { message, .. } => {
            assert_eq!(message, "Code: 516. Authentication failed")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decimal_round_trip_is_exact() {
    let store = MemoryStore::new();
    let registry = TypeRegistry::new();
    let table = TableName::new("default", "trades_f");
    TableProvisioner::new(&store, &registry)
        .provision(&TRADE, &table, true, None)
        .unwrap();

    let amounts = [
        "0.000000000000000001",
        "-123456789.123456789012345678",
        "9999999999.999999999999999999",
        "1500000.00",
        "100000000000",
        "100000000000.000001",
    ];
    let records: Vec<Record> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| trade(i as i64, 1, Some(*amount)))
        .chain(std::iter::once(trade(99, 1, None)))
        .collect();
    BatchWriter::new(&store).write(&trades(&records), &table).unwrap();

    let stored = store.column_values(&table, "collatNotional").unwrap();
    let mut expected: Vec<Value> = amounts
        .iter()
        .map(|a| Value::Decimal(Decimal::from_str(a).unwrap()))
        .collect();
    expected.push(Value::Null);
    assert_eq!(stored, expected);
}

#[test]
fn test_latest_version_wins() {
    let store = MemoryStore::new();
    let registry = TypeRegistry::new();
    let table = TableName::new("default", "trades_f");
    TableProvisioner::new(&store, &registry)
        .provision(&TRADE, &table, true, None)
        .unwrap();

    let writer = BatchWriter::new(&store);
    writer
        .write(&trades(&[trade(1, 1, Some("100")), trade(2, 1, Some("200"))]), &table)
        .unwrap();
    writer
        .write(&trades(&[trade(1, 2, Some("150"))]), &table)
        .unwrap();

    let rows = store.final_rows(&table).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["version"], Value::Int64(2));
    assert_eq!(
        rows[0]["collatNotional"],
        Value::Decimal(Decimal::from_str("150").unwrap())
    );
}

#[test]
fn test_risk_view_requires_source_tables() {
    let store = MemoryStore::new();
    let registry = TypeRegistry::new();
    let sources = ViewSources::in_database("default");
    let view = risk_view(TableName::new("default", RISK_VIEW), &sources);

    assert!(matches!(
        recreate_view(&store, &view),
        Err(StoreError::Ddl { .. })
    ));

    let provisioner = TableProvisioner::new(&store, &registry);
    for entity in [&RISK, &TRADE, &COUNTERPARTY, &INSTRUMENT, &HMS_BOOK] {
        let table = TableName::new("default", entity.default_table);
        provisioner.provision(entity, &table, true, None).unwrap();
    }
    recreate_view(&store, &view).unwrap();
    assert!(store.is_view(&view.name));

    // recreating drops the previous definition first
    recreate_view(&store, &view).unwrap();
    assert!(store.executed().iter().any(|sql| sql.ends_with("SETTINGS join_use_nulls = 1")));
}
