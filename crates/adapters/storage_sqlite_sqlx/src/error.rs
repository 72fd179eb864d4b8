//! Storage-specific error type wrapping sqlx errors.

use maintrack_domain::error::MaintrackError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be turned back into a domain value.
    #[error("invalid stored value in column {column}: {value:?}")]
    Decode { column: &'static str, value: String },
}

impl StorageError {
    pub(crate) fn decode(column: &'static str, value: impl Into<String>) -> sqlx::Error {
        sqlx::Error::Decode(Box::new(Self::Decode {
            column,
            value: value.into(),
        }))
    }
}

impl From<StorageError> for MaintrackError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
