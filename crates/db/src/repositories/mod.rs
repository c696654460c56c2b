use thiserror::Error;

use storefront_core::store::StoreError;

pub mod document;
pub mod memory;
pub mod preference;

pub use document::SqlDocumentStore;
pub use memory::{InMemoryDocumentStore, InMemoryPreferenceStore};
pub use preference::SqlPreferenceRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(sqlx::Error::Database(database)) => {
                StoreError::Rejected(database.to_string())
            }
            RepositoryError::Database(other) => StoreError::Unavailable(other.to_string()),
            RepositoryError::Decode(message) => StoreError::Decode(message),
        }
    }
}

pub(crate) fn decode_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
