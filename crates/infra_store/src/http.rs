//! ClickHouse HTTP interface client.

use crate::client::{StoreClient, StoreConfig};
use crate::ddl::{Statement, TableName};
use crate::error::{StoreError, StoreResult};
use crate::sql_writer::{ClickHouseWriter, SqlWriter};
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::{debug, info};

const USER_HEADER: &str = "X-ClickHouse-User";
const KEY_HEADER: &str = "X-ClickHouse-Key";

/// Blocking client for one store, created once per run.
#[derive(Debug)]
pub struct ClickHouseClient {
    http: Client,
    config: StoreConfig,
    writer: ClickHouseWriter,
}

impl ClickHouseClient {
    /// Connect and check the server answers `/ping`.
    ///
    /// # Errors
    /// [`StoreError::Connection`] if the server is unreachable or unhealthy.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let endpoint = config.endpoint();
        let connection_error = |message: String| StoreError::Connection {
            endpoint: endpoint.clone(),
            message,
        };

        let http = Client::builder()
            .build()
            .map_err(|e| connection_error(e.to_string()))?;
        let response = http
            .get(format!("{}/ping", endpoint))
            .send()
            .map_err(|e| connection_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(connection_error(format!(
                "ping returned {}",
                response.status()
            )));
        }

        info!(endpoint = %endpoint, user = %config.username, "connected to store");
        Ok(Self {
            http,
            config: config.clone(),
            writer: ClickHouseWriter,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn request(&self) -> RequestBuilder {
        self.http
            .post(format!("{}/", self.config.endpoint()))
            .header(USER_HEADER, &self.config.username)
            .header(KEY_HEADER, &self.config.password)
            .query(&[("database", self.config.database.as_str())])
    }

    /// Body text of a failed response, or the status line if it has none.
    fn failure(response: Response) -> String {
        let status = response.status();
        match response.text() {
            Ok(body) if !body.trim().is_empty() => body.trim().to_string(),
            _ => status.to_string(),
        }
    }
}

impl StoreClient for ClickHouseClient {
    fn execute(&self, statement: &Statement) -> StoreResult<()> {
        let sql = self.writer.render(statement);
        debug!(sql = %sql, "executing DDL");
        let response = self.request().body(sql.clone()).send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Ddl {
                statement: sql,
                message: Self::failure(response),
            })
        }
    }

    fn insert_arrow(&self, table: &TableName, stream: Vec<u8>) -> StoreResult<()> {
        let mut sql = String::new();
        self.writer.write_insert_arrow(&mut sql, table);
        debug!(table = %table, bytes = stream.len(), "inserting arrow stream");
        let response = self
            .request()
            .query(&[("query", sql.as_str())])
            .body(stream)
            .send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Insert {
                table: table.clone(),
                message: Self::failure(response),
            })
        }
    }
}
