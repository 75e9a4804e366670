//! # risk-loader
//!
//! Provisions the risk warehouse tables in ClickHouse and fills them with
//! synthetic reference, trade and risk data.
//!
//! # Commands
//!
//! - `risk-loader load` - Provision tables, recreate the view and load data
//!   (the default when no command is given)
//! - `risk-loader view` - Recreate the risk materialized view only
//! - `risk-loader ddl` - Print every DDL statement without connecting
//!
//! As part of the service layer this crate wires the store and generator
//! crates together; [`pipeline::LoadPipeline`] runs against any
//! [`StoreClient`](infra_store::client::StoreClient).

pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;

pub use error::{CliError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::commands::load::LoadOptions;
    pub use crate::config::{ConfigError, GenerationConfig, LoaderConfig, DEFAULT_CONFIG_FILE};
    pub use crate::error::{CliError, Result};
    pub use crate::pipeline::{LoadPipeline, LoadReport, LoadStep};
}
