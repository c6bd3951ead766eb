/// Storage-specific errors
use thiserror::Error;

/// Errors raised while opening or migrating the database
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for vidshelf_core::VidshelfError {
    fn from(err: StorageError) -> Self {
        vidshelf_core::VidshelfError::Database(err.to_string())
    }
}
