//! # Market Error Type
//!
//! The one error type engine operations return.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CoreError::ItemNotFound / SwapNotFound / ...  ──► NOT_FOUND   (404)   │
//! │  CoreError (any other rule)                    ──► BAD_REQUEST (400)   │
//! │  DbError::Rule(core)                           ──► as CoreError        │
//! │  DbError::NotFound                             ──► NOT_FOUND   (404)   │
//! │  DbError::UniqueViolation / Conflict / FK      ──► BAD_REQUEST (400)   │
//! │  DbError::Busy (lost a concurrent write)       ──► BAD_REQUEST (400)   │
//! │  DbError (connection, query, pool, ...)        ──► INTERNAL    (500)   │
//! │                                                  message is generic,   │
//! │                                                  details go to the log │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "BAD_REQUEST",
//!   "message": "Amount too low: $50.00 required, $40.00 offered"
//! }
//! ```

use serde::Serialize;
use swapmart_core::{CoreError, ErrorKind};
use swapmart_db::DbError;
use thiserror::Error;

/// Error returned by [`SwapEngine`](crate::SwapEngine) and
/// [`PurchaseService`](crate::PurchaseService).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct MarketError {
    /// Machine-readable classification.
    #[serde(rename = "code")]
    pub kind: ErrorKind,

    /// Human-readable message for display.
    pub message: String,
}

impl MarketError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        MarketError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        MarketError::new(ErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        MarketError::new(ErrorKind::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MarketError::new(ErrorKind::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl From<CoreError> for MarketError {
    fn from(err: CoreError) -> Self {
        MarketError::new(err.kind(), err.to_string())
    }
}

impl From<DbError> for MarketError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rule(core) => core.into(),
            DbError::NotFound { .. } => MarketError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => MarketError::bad_request(err.to_string()),
            DbError::Conflict { .. } => {
                tracing::warn!("Concurrent settlement lost: {}", err);
                MarketError::bad_request(err.to_string())
            }
            DbError::Busy(e) => {
                tracing::warn!("Concurrent write lost: {}", e);
                MarketError::bad_request(
                    "Another operation changed this record at the same time, try again",
                )
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                MarketError::bad_request("Invalid reference")
            }
            DbError::ConnectionFailed(_) => MarketError::internal("Database connection failed"),
            DbError::MigrationFailed(_) => MarketError::internal("Database migration failed"),
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                MarketError::internal("Database operation failed")
            }
            DbError::PoolExhausted => MarketError::internal("Database pool exhausted"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                MarketError::internal("Database operation failed")
            }
        }
    }
}

/// Allows `?` directly on a `sqlx` call such as `tx.commit()`.
impl From<sqlx::Error> for MarketError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

/// Result type for engine operations.
pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;
    use swapmart_core::{Money, ValidationError};

    #[test]
    fn test_core_errors_are_classified() {
        let missing: MarketError = CoreError::SwapNotFound("s-1".into()).into();
        assert_eq!(missing.kind, ErrorKind::NotFound);
        assert_eq!(missing.status_code(), 404);

        let short: MarketError = CoreError::InsufficientAmount {
            required: Money::from_cents(5_000),
            offered: Money::from_cents(4_000),
        }
        .into();
        assert_eq!(short.kind, ErrorKind::BadRequest);
        assert_eq!(short.message, "Amount too low: $50.00 required, $40.00 offered");

        let invalid: MarketError = CoreError::from(ValidationError::MustNotBeNegative {
            field: "amount".into(),
        })
        .into();
        assert_eq!(invalid.status_code(), 400);
    }

    #[test]
    fn test_db_errors_are_classified() {
        let rule: MarketError = DbError::Rule(CoreError::CategoryBanned("TOYS".into())).into();
        assert_eq!(rule.kind, ErrorKind::BadRequest);
        assert_eq!(rule.message, "Category TOYS is banned");

        let missing: MarketError = DbError::not_found("Swap request", "s-1").into();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let raced: MarketError = DbError::conflict("Item", "i-1").into();
        assert_eq!(raced.kind, ErrorKind::BadRequest);

        let locked: MarketError = DbError::Busy("database is locked".into()).into();
        assert_eq!(locked.kind, ErrorKind::BadRequest);
        assert!(!locked.message.contains("locked"));

        let broken: MarketError = DbError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(broken.kind, ErrorKind::Internal);
        assert_eq!(broken.message, "Database operation failed");
    }

    #[test]
    fn test_serialization() {
        let err = MarketError::not_found("Item not found: i-9");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Item not found: i-9");
    }
}
