use homegame_core::{AmountOverflow, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Stored amounts summed past the decimal range. Only reachable with rows
    /// written outside the store.
    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

impl DbError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }
}
