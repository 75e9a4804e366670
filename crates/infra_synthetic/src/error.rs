//! Generator error types.

use infra_store::batch::BatchError;
use thiserror::Error;

/// Errors raised while generating synthetic batches.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A reference batch was supplied but has no rows
    #[error("reference batch for {entity} is empty")]
    EmptyReference { entity: &'static str },

    /// A reference batch holds a different entity
    #[error("expected a {expected} reference batch, got {found}")]
    WrongEntity {
        expected: &'static str,
        found: &'static str,
    },

    /// A reference key is null
    #[error("{entity}.{field} is null in reference row {row}")]
    NullReference {
        entity: &'static str,
        field: &'static str,
        row: usize,
    },

    /// Dependents per parent must be at least one
    #[error("records per parent must be at least 1, got {0}")]
    InvalidFanOut(usize),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
