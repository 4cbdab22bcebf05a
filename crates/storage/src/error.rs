use thiserror::Error;

/// Errors that can occur in the data access layer.
///
/// Database errors propagate unmodified; translation to domain or HTTP
/// errors is the caller's responsibility.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its domain type.
    #[error("Row decoding error: {0}")]
    Decode(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
