use thiserror::Error;

use mog_core::ledger::StoreError;

pub mod desire;
pub mod memory;

pub use desire::SqlDesireStore;
pub use memory::InMemoryDesireStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => StoreError::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => StoreError::Domain(
                mog_core::DomainError::InvariantViolation(format!("corrupt desire row: {message}")),
            ),
        }
    }
}
