//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MarketError (swapmart-engine) ← kind + message for the HTTP layer     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use swapmart_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second request for the same (initiator, target item)
    /// - Duplicate category name
    /// - Duplicate user name, email or phone number
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A compare-and-swap update matched no rows.
    ///
    /// ## When This Occurs
    /// - Two settlements race for the same item (`sold = 0` guard)
    /// - Two owners act on the same swap request (`state = ?` guard)
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// Another connection holds the write lock, or committed first and left
    /// this transaction's snapshot stale (`SQLITE_BUSY`, `SQLITE_LOCKED` and
    /// their extended codes).
    #[error("Database is busy: {0}")]
    Busy(String),

    /// A marketplace rule rejected the write (unknown or banned category,
    /// invalid name or price).
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Conflict error for a lost compare-and-swap.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Busy/locked codes, then constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.code().as_deref().is_some_and(is_busy_code) {
                    return DbError::Busy(msg.to_string());
                }

                // "UNIQUE constraint failed: <table>.<column>[, <table>.<column>]"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLite reports extended result codes; the low byte is the primary code.
/// 5 is `SQLITE_BUSY` (517 `BUSY_SNAPSHOT`, 773 `BUSY_TIMEOUT`), 6 is
/// `SQLITE_LOCKED`.
fn is_busy_code(code: &str) -> bool {
    code.parse::<i32>()
        .is_ok_and(|code| matches!(code & 0xff, 5 | 6))
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_busy_codes() {
        assert!(is_busy_code("5"));
        assert!(is_busy_code("517"));
        assert!(is_busy_code("773"));
        assert!(is_busy_code("6"));
        assert!(!is_busy_code("19"));
        assert!(!is_busy_code("2067"));
        assert!(!is_busy_code("not-a-code"));
    }

    #[test]
    fn test_conflict_message() {
        let err = DbError::conflict("Item", "i1");
        assert_eq!(err.to_string(), "Item i1 was modified concurrently");
        assert!(!err.is_unique_violation());
        assert!(DbError::duplicate("categories.name", "BOOKS").is_unique_violation());
    }
}
