//! SQL rendering of DDL and insert statements.

use crate::ddl::{
    ColumnDef, ColumnRef, CreateTable, Engine, JoinClause, MaterializedView, Statement, TableName,
    TableSource,
};
use std::fmt::Write;

/// Write every item of `values` with `f`, with `separator` between items.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        f(out, v);
    }
}

/// Dialect printer turning statements into SQL text.
///
/// Every method has a default rendering; a dialect overrides only what
/// differs.
pub trait SqlWriter {
    /// Copy `value` into `out`, substituting every char listed in `escapes`.
    fn write_escaped(&self, out: &mut String, value: &str, escapes: &[(char, &str)]) {
        for c in value.chars() {
            match escapes.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => out.push_str(to),
                None => out.push(c),
            }
        }
    }

    /// Quote an identifier with backticks, doubling inner backticks.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, &[('`', "``")]);
        out.push('`');
    }

    fn write_table_name(&self, out: &mut String, table: &TableName) {
        if !table.database.is_empty() {
            self.write_identifier_quoted(out, &table.database);
            out.push('.');
        }
        self.write_identifier_quoted(out, &table.name);
    }

    fn write_table_source(&self, out: &mut String, source: &TableSource) {
        self.write_table_name(out, &source.table);
        out.push_str(" AS ");
        self.write_identifier_quoted(out, &source.alias);
    }

    fn write_column_ref(&self, out: &mut String, column: &ColumnRef) {
        self.write_identifier_quoted(out, &column.source);
        out.push('.');
        self.write_identifier_quoted(out, &column.column);
    }

    fn write_column_def(&self, out: &mut String, column: &ColumnDef) {
        self.write_identifier_quoted(out, &column.name);
        let _ = write!(out, " {}", column.store_type);
    }

    fn write_engine(&self, out: &mut String, engine: &Engine) {
        match engine {
            Engine::ReplacingMergeTree { version } => {
                out.push_str("ENGINE = ReplacingMergeTree(");
                self.write_identifier_quoted(out, version);
                out.push(')');
            }
        }
    }

    fn write_order_by(&self, out: &mut String, keys: &[String]) {
        out.push_str("ORDER BY (");
        separated_by(out, keys, |out, key| self.write_identifier_quoted(out, key), ", ");
        out.push(')');
    }

    fn write_drop_table(&self, out: &mut String, table: &TableName, if_exists: bool) {
        out.push_str("DROP TABLE ");
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_name(out, table);
    }

    fn write_create_table(&self, out: &mut String, create: &CreateTable) {
        out.reserve(128 + create.columns.len() * 48);
        out.push_str("CREATE TABLE ");
        if create.if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_table_name(out, &create.table);
        out.push_str(" (\n    ");
        separated_by(
            out,
            &create.columns,
            |out, column| self.write_column_def(out, column),
            ",\n    ",
        );
        out.push_str("\n) ");
        self.write_engine(out, &create.engine);
        out.push(' ');
        self.write_order_by(out, &create.order_by);
    }

    fn write_join(&self, out: &mut String, join: &JoinClause) {
        out.push_str("LEFT JOIN ");
        self.write_table_source(out, &join.source);
        out.push_str(" ON ");
        self.write_column_ref(out, &join.left);
        out.push_str(" = ");
        self.write_column_ref(out, &join.right);
    }

    fn write_create_materialized_view(&self, out: &mut String, view: &MaterializedView) {
        out.reserve(256 + view.projections.len() * 48);
        out.push_str("CREATE MATERIALIZED VIEW ");
        if view.if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_table_name(out, &view.name);
        out.push('\n');
        self.write_engine(out, &view.engine);
        out.push('\n');
        self.write_order_by(out, &view.order_by);
        out.push_str("\nAS SELECT\n    ");
        separated_by(
            out,
            &view.projections,
            |out, projection| {
                self.write_column_ref(out, &projection.column);
                out.push_str(" AS ");
                self.write_identifier_quoted(out, &projection.alias);
            },
            ",\n    ",
        );
        out.push_str("\nFROM ");
        self.write_table_source(out, &view.from);
        for join in &view.joins {
            out.push('\n');
            self.write_join(out, join);
        }
        if !view.settings.is_empty() {
            out.push_str("\nSETTINGS ");
            separated_by(
                out,
                &view.settings,
                |out, (name, value)| {
                    let _ = write!(out, "{} = {}", name, value);
                },
                ", ",
            );
        }
    }

    fn write_statement(&self, out: &mut String, statement: &Statement) {
        match statement {
            Statement::DropTable { table, if_exists } => {
                self.write_drop_table(out, table, *if_exists)
            }
            Statement::CreateTable(create) => self.write_create_table(out, create),
            Statement::CreateMaterializedView(view) => {
                self.write_create_materialized_view(out, view)
            }
        }
    }

    /// Insert statement whose data follows as an Arrow IPC stream.
    fn write_insert_arrow(&self, out: &mut String, table: &TableName) {
        out.push_str("INSERT INTO ");
        self.write_table_name(out, table);
        out.push_str(" FORMAT ArrowStream");
    }

    /// Render a statement into a fresh string.
    fn render(&self, statement: &Statement) -> String {
        let mut out = String::new();
        self.write_statement(&mut out, statement);
        out
    }
}

/// ClickHouse dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickHouseWriter;

impl SqlWriter for ClickHouseWriter {
    /// ClickHouse reads backslash escapes inside backquoted identifiers.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, &[('\\', "\\\\"), ('`', "\\`")]);
        out.push('`');
    }
}

/// Writer with the default rendering only.
#[cfg(test)]
struct AnsiWriter;

#[cfg(test)]
impl SqlWriter for AnsiWriter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::Projection;
    use crate::types::StoreType;

    fn table(name: &str) -> TableName {
        TableName::new("risk", name)
    }

    #[test]
    fn test_identifier_escaping() {
        let mut out = String::new();
        ClickHouseWriter.write_identifier_quoted(&mut out, "we`ird");
        assert_eq!(out, r"`we\`ird`");

        out.clear();
        ClickHouseWriter.write_identifier_quoted(&mut out, r"back\slash");
        assert_eq!(out, r"`back\\slash`");

        out.clear();
        AnsiWriter.write_identifier_quoted(&mut out, "we`ird");
        assert_eq!(out, "`we``ird`");
    }

    #[test]
    fn test_separated_by() {
        let mut out = String::from("(");
        separated_by(&mut out, ["a", "b", "c"], |out, v| out.push_str(v), ", ");
        out.push(')');
        assert_eq!(out, "(a, b, c)");

        let mut out = String::new();
        separated_by(&mut out, Vec::<&str>::new(), |out, v| out.push_str(v), ", ");
        assert!(out.is_empty());
    }

    #[test]
    fn test_drop_table() {
        let sql = ClickHouseWriter.render(&Statement::DropTable {
            table: table("trades_f"),
            if_exists: true,
        });
        assert_eq!(sql, "DROP TABLE IF EXISTS `risk`.`trades_f`");
    }

    #[test]
    fn test_create_table() {
        let create = CreateTable {
            table: table("hmsbook_f"),
            if_not_exists: true,
            columns: vec![
                ColumnDef {
                    name: "name".to_string(),
                    store_type: StoreType::String,
                },
                ColumnDef {
                    name: "limit".to_string(),
                    store_type: StoreType::Decimal {
                        precision: 38,
                        scale: 18,
                    }
                    .nullable(),
                },
                ColumnDef {
                    name: "updatedAt".to_string(),
                    store_type: StoreType::DateTime,
                },
            ],
            engine: Engine::ReplacingMergeTree {
                version: "updatedAt".to_string(),
            },
            order_by: vec!["name".to_string()],
        };
        let sql = ClickHouseWriter.render(&Statement::CreateTable(create));
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `risk`.`hmsbook_f` (\n    \
             `name` String,\n    \
             `limit` Nullable(Decimal(38, 18)),\n    \
             `updatedAt` DateTime\n\
             ) ENGINE = ReplacingMergeTree(`updatedAt`) ORDER BY (`name`)"
        );
    }

    #[test]
    fn test_materialized_view() {
        let view = MaterializedView {
            name: table("risk_f_mv"),
            if_not_exists: false,
            engine: Engine::ReplacingMergeTree {
                version: "calculatedAt".to_string(),
            },
            order_by: vec!["asOfDate".to_string(), "id".to_string()],
            from: TableSource {
                table: table("risk_f"),
                alias: "r".to_string(),
            },
            joins: vec![JoinClause {
                source: TableSource {
                    table: table("trades_f"),
                    alias: "t".to_string(),
                },
                left: ColumnRef::new("r", "id"),
                right: ColumnRef::new("t", "id"),
            }],
            projections: vec![
                Projection {
                    column: ColumnRef::new("r", "id"),
                    alias: "id".to_string(),
                },
                Projection {
                    column: ColumnRef::new("t", "status"),
                    alias: "trade_status".to_string(),
                },
            ],
            settings: vec![("join_use_nulls".to_string(), "1".to_string())],
        };
        let sql = ClickHouseWriter.render(&Statement::CreateMaterializedView(view));
        assert!(sql.starts_with("CREATE MATERIALIZED VIEW `risk`.`risk_f_mv`\n"));
        assert!(sql.contains(
            "ENGINE = ReplacingMergeTree(`calculatedAt`)\nORDER BY (`asOfDate`, `id`)"
        ));
        assert!(sql.contains("`t`.`status` AS `trade_status`"));
        assert!(sql.contains(concat!(
            "FROM `risk`.`risk_f` AS `r`\n",
            "LEFT JOIN `risk`.`trades_f` AS `t` ON `r`.`id` = `t`.`id`"
        )));
        assert!(sql.ends_with("SETTINGS join_use_nulls = 1"));
    }

    #[test]
    fn test_insert_arrow() {
        let mut out = String::new();
        ClickHouseWriter.write_insert_arrow(&mut out, &table("risk_f"));
        assert_eq!(out, "INSERT INTO `risk`.`risk_f` FORMAT ArrowStream");
    }
}
