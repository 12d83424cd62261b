//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached at startup.
    #[error("failed to connect to document store: {0}")]
    Connection(#[source] mongodb::error::Error),

    /// A store operation failed.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// The store assigned an identifier that is not an ObjectId.
    #[error("store assigned unexpected identifier: {0}")]
    UnexpectedId(String),

    /// The store has been shut down.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
