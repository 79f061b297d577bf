//! # Sync Error Types
//!
//! Error types for mirrors, write tracking and process settings.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Store       │  │     Records             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Store          │  │  SerializationFailed    │ │
//! │  │  ConfigLoad…    │  │  AckTimeout     │  │                         │ │
//! │  │  ConfigSave…    │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use grocer_store::{StoreError, Table};

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid storefront settings: {0}")]
    InvalidConfig(String),

    #[error("Failed to load settings: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save settings: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// The table store rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A write succeeded but its change notification was not applied to the
    /// local mirror in time.
    #[error("Revision {revision} of {table} not applied within {timeout_ms} ms")]
    AckTimeout {
        table: Table,
        revision: u64,
        timeout_ms: u64,
    },

    // =========================================================================
    // Record Errors
    // =========================================================================
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Whether the store could not be reached, so the same write may succeed
    /// later. Rejected records and timeouts are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Store(StoreError::Unavailable(_))
                | SyncError::Store(StoreError::ConnectionFailed(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let offline = SyncError::Store(StoreError::Unavailable("offline".into()));
        assert!(offline.is_retryable());

        let rejected = SyncError::Store(StoreError::QueryFailed("constraint".into()));
        assert!(!rejected.is_retryable());

        let bad = SyncError::InvalidConfig("write_ack_timeout_ms".into());
        assert!(!bad.is_retryable());
    }

    #[test]
    fn test_ack_timeout_message() {
        let err = SyncError::AckTimeout {
            table: Table::Orders,
            revision: 7,
            timeout_ms: 2000,
        };
        assert_eq!(err.to_string(), "Revision 7 of orders not applied within 2000 ms");
    }
}
