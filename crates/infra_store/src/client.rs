//! Store client contract and connection settings.

use crate::ddl::{Statement, TableName};
use crate::error::StoreResult;
use serde::{Deserialize, Serialize};

/// Operations the loader needs from a store.
///
/// Implementations execute each call once, synchronously, and report the
/// store's own error without retrying.
pub trait StoreClient {
    /// Execute one DDL statement.
    fn execute(&self, statement: &Statement) -> StoreResult<()>;

    /// Append an Arrow IPC stream to `table`.
    fn insert_arrow(&self, table: &TableName, stream: Vec<u8>) -> StoreResult<()>;
}

impl<C: StoreClient + ?Sized> StoreClient for &C {
    fn execute(&self, statement: &Statement) -> StoreResult<()> {
        (**self).execute(statement)
    }

    fn insert_arrow(&self, table: &TableName, stream: Vec<u8>) -> StoreResult<()> {
        (**self).insert_arrow(table, stream)
    }
}

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl StoreConfig {
    /// Base URL of the HTTP interface.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8123,
            username: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.endpoint(), "http://localhost:8123");
        assert_eq!(config.username, "default");
        assert!(config.password.is_empty());
        assert_eq!(config.database, "default");
    }
}
