//! Loader configuration management.
//!
//! Handles loading of the loader configuration from a TOML file with
//! environment variable override support.

use infra_store::client::StoreConfig;
use serde::Deserialize;
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "risk_loader.toml";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How much data one load run generates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of trading books
    pub books: usize,
    /// Number of counterparties
    pub counterparties: usize,
    /// Number of collateral instruments
    pub instruments: usize,
    /// Number of trades
    pub trades: usize,
    /// Risk and risk MV rows per trade
    pub risks_per_trade: usize,
    /// Drop tables before creating them
    pub drop_existing: bool,
    /// Recreate the risk materialized view after provisioning
    pub create_view: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            books: 10,
            counterparties: 10,
            instruments: 10,
            trades: 100,
            risks_per_trade: 1,
            drop_existing: true,
            create_view: true,
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Generation volumes
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment overrides that could not be applied
    #[serde(skip)]
    env_problems: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            generation: GenerationConfig::default(),
            log_level: default_log_level(),
            env_problems: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`, or defaults when the file is missing.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_override(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up through `var`.
    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = var("RISK_LOADER_HOST") {
            self.store.host = host;
        }

        if let Some(port) = var("RISK_LOADER_PORT") {
            match port.parse() {
                Ok(port) => self.store.port = port,
                Err(_) => self
                    .env_problems
                    .push(format!("RISK_LOADER_PORT '{}' is not a valid port", port)),
            }
        }

        if let Some(username) = var("RISK_LOADER_USER") {
            self.store.username = username;
        }

        if let Some(password) = var("RISK_LOADER_PASSWORD") {
            self.store.password = password;
        }

        if let Some(database) = var("RISK_LOADER_DATABASE") {
            self.store.database = database;
        }

        if let Some(log_level) = var("RISK_LOADER_LOG_LEVEL") {
            self.log_level = log_level;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.env_problems.clone();

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        if self.store.host.trim().is_empty() {
            errors.push("store.host cannot be empty".to_string());
        }
        if self.store.port == 0 {
            errors.push("store.port must be greater than 0".to_string());
        }
        if self.store.database.is_empty()
            || !self
                .store
                .database
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(format!(
                "Invalid store.database '{}'. Use letters, digits and underscores",
                self.store.database
            ));
        }

        let generation = &self.generation;
        for (name, count) in [
            ("books", generation.books),
            ("counterparties", generation.counterparties),
            ("instruments", generation.instruments),
        ] {
            if count == 0 {
                errors.push(format!("generation.{} must be greater than 0", name));
            }
        }
        if generation.risks_per_trade == 0 {
            errors.push("generation.risks_per_trade must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from `path` (or defaults) with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }
}

/// Configuration error type
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading config file
    Io(String),
    /// Parse error in config file
    Parse(String),
    /// Validation error
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Validation(errors) => write!(f, "Validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn validation_errors(config: &LoaderConfig) -> Vec<String> {
        match config.validate() {
            Err(ConfigError::Validation(errors)) => errors,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.store.endpoint(), "http://localhost:8123");
        assert_eq!(config.store.username, "default");
        assert_eq!(config.store.database, "default");
        assert_eq!(config.generation.trades, 100);
        assert_eq!(config.generation.risks_per_trade, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n\n\
             [store]\nhost = \"ch.internal\"\ndatabase = \"risk\"\n\n\
             [generation]\ntrades = 250\ndrop_existing = false"
        )
        .unwrap();

        let config = LoaderConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store.host, "ch.internal");
        assert_eq!(config.store.port, 8123);
        assert_eq!(config.store.database, "risk");
        assert_eq!(config.generation.trades, 250);
        assert_eq!(config.generation.books, 10);
        assert!(!config.generation.drop_existing);
        assert!(config.generation.create_view);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nport = ").unwrap();
        assert!(matches!(
            LoaderConfig::load_or_default(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let config = LoaderConfig::default().with_overrides(overrides(&[
            ("RISK_LOADER_HOST", "clickhouse"),
            ("RISK_LOADER_PORT", "9000"),
            ("RISK_LOADER_USER", "loader"),
            ("RISK_LOADER_PASSWORD", "secret"),
            ("RISK_LOADER_DATABASE", "risk"),
            ("RISK_LOADER_LOG_LEVEL", "warn"),
        ]));
        assert_eq!(config.store.host, "clickhouse");
        assert_eq!(config.store.port, 9000);
        assert_eq!(config.store.username, "loader");
        assert_eq!(config.store.password, "secret");
        assert_eq!(config.store.database, "risk");
        assert_eq!(config.log_level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_override_reported() {
        let config =
            LoaderConfig::default().with_overrides(overrides(&[("RISK_LOADER_PORT", "eighty")]));
        assert_eq!(config.store.port, 8123);
        let errors = validation_errors(&config);
        assert!(errors.iter().any(|e| e.contains("RISK_LOADER_PORT")));
    }

    #[test]
    fn test_validate_valid_log_levels() {
        for level in &["trace", "debug", "info", "warn", "error", "INFO"] {
            let mut config = LoaderConfig::default();
            config.log_level = level.to_string();
            assert!(config.validate().is_ok(), "Log level '{}' should be valid", level);
        }
    }

    #[test]
    fn test_validate_invalid_database() {
        let mut config = LoaderConfig::default();
        config.store.database = "risk; DROP".to_string();
        let errors = validation_errors(&config);
        assert!(errors.iter().any(|e| e.contains("store.database")));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let mut config = LoaderConfig::default();
        config.log_level = "loud".to_string();
        config.store.host = String::new();
        config.generation.books = 0;
        config.generation.risks_per_trade = 0;

        let errors = validation_errors(&config);
        assert_eq!(errors.len(), 4, "{:?}", errors);
    }

    #[test]
    fn test_zero_trades_is_allowed() {
        let mut config = LoaderConfig::default();
        config.generation.trades = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Validation(vec!["Error 1".to_string(), "Error 2".to_string()]);
        let display = format!("{}", error);
        assert!(display.contains("Error 1"));
        assert!(display.contains("Error 2"));
    }
}
