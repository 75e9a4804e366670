//! Error types for the risk loader.

use crate::config::ConfigError;
use infra_store::error::StoreError;
use infra_synthetic::error::GeneratorError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store connection, DDL or insert failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Synthetic data generation failure
    #[error("Generation error: {0}")]
    Generator(#[from] GeneratorError),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::from(ConfigError::Validation(vec!["generation.books".to_string()]));
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("generation.books"));
    }
}
