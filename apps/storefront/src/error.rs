//! # API Error Type
//!
//! Unified error type for storefront operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Operation                                                              │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation Error? ─── ValidationError ─────────────► VALIDATION_ERROR  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rule broken? ──────── CoreError::OrderNotEditable ─► NOT_EDITABLE      │
//! │         │              CoreError::ItemsLocked ──────► ITEMS_LOCKED      │
//! │         │              CoreError::EmptyBasket ──────► BASKET_ERROR      │
//! │         ▼                                                               │
//! │  Store write failed? ── never an Err: WriteStatus::NotSaved             │
//! │         │               plus an entry in sync_issues()                  │
//! │         ▼                                                               │
//! │  Success ─────────────────────────────────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors carry a machine-readable `code` and a human-readable `message`,
//! so a UI can branch on the code and show the message next to the field.

use serde::Serialize;
use thiserror::Error;

use grocer_core::{CoreError, ValidationError};

/// Error returned from storefront operations.
///
/// ```json
/// {
///   "code": "NOT_EDITABLE",
///   "message": "Order ORD-… can no longer be modified"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed; nothing was written
    ValidationError,

    /// Unknown mobile number or wrong password (never says which)
    InvalidCredentials,

    /// Edit window closed or order already being purchased
    NotEditable,

    /// Per-item fulfillment no longer allowed for the order's status
    ItemsLocked,

    /// The operation needs a signed-in user
    NotSignedIn,

    /// Basket operation failed
    BasketError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::InvalidCredentials, "Invalid mobile number or password")
    }

    pub fn not_signed_in() -> Self {
        ApiError::new(ErrorCode::NotSignedIn, "Please sign in first")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn basket(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BasketError, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyBasket => ApiError::basket("Basket is empty"),
            CoreError::ItemNotInBasket(id) => {
                ApiError::basket(format!("Item not in basket: {}", id))
            }
            err @ CoreError::OrderNotEditable { .. } => {
                ApiError::new(ErrorCode::NotEditable, err.to_string())
            }
            err @ CoreError::ItemsLocked { .. } => {
                ApiError::new(ErrorCode::ItemsLocked, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_core::OrderStatus;

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::OrderNotEditable {
            order_id: "ORD-1".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotEditable);

        let err: ApiError = CoreError::ItemsLocked {
            order_id: "ORD-1".into(),
            status: OrderStatus::Delivered,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ItemsLocked);

        let err: ApiError = CoreError::EmptyBasket.into();
        assert_eq!(err.code, ErrorCode::BasketError);
    }

    #[test]
    fn test_serialization() {
        let value = serde_json::to_value(ApiError::invalid_credentials()).unwrap();
        assert_eq!(value["code"], "INVALID_CREDENTIALS");
        assert_eq!(value["message"], "Invalid mobile number or password");
    }
}
