//! # Store Error Types
//!
//! Error types for table store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error) / memory store offline                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module)                                              │
//! │       │                                                                 │
//! │       ├── fetch path: logged, replaced by an empty snapshot            │
//! │       │                                                                 │
//! │       └── write path: logged, surfaced as WriteStatus::NotSaved        │
//! │                       and a Failed entry in the sync tracker           │
//! │                                                                         │
//! │  StoreError never reaches the presentation layer as an error.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Table store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached.
    ///
    /// ## When This Occurs
    /// - Memory store switched offline with `set_available(false)`
    /// - SQLite pool closed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Record could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - Saving a record that is not a JSON object
    /// - Stored `data` column is not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database     → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut → StoreError::Unavailable
/// sqlx::Error::PoolClosed   → StoreError::Unavailable
/// sqlx::Error::Io           → StoreError::ConnectionFailed
/// Other                     → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(io_err) => StoreError::ConnectionFailed(io_err.to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
