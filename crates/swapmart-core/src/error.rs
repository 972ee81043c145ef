//! # Error Types
//!
//! Domain-specific error types for swapmart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  swapmart-core errors (this file)                                      │
//! │  ├── CoreError        - Marketplace rule violations                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  swapmart-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  swapmart-engine errors                                                │
//! │  └── MarketError      - What the HTTP layer sees (kind + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴─► MarketError → 404 / 400 / 500  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item ID, swap ID, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every variant classifies into an [`ErrorKind`]

use serde::Serialize;
use thiserror::Error;

use crate::money::Money;
use crate::swap::{SwapEvent, SwapState};

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification shared by every error in the workspace.
///
/// The HTTP layer maps these to status codes: 404, 400 and 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// An item, user, category or swap request id does not resolve.
    NotFound,
    /// A precondition was violated by the caller.
    BadRequest,
    /// Unexpected store failure.
    Internal,
}

impl ErrorKind {
    /// HTTP status code conventionally used for this kind.
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::Internal => 500,
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Marketplace business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item id does not resolve.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// User id does not resolve.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// No swap request matches the id (and owner, where one is required).
    #[error("Swap request not found: {0}")]
    SwapNotFound(String),

    /// Category name does not resolve.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Category exists but items can no longer be listed under it.
    #[error("Category {0} is banned")]
    CategoryBanned(String),

    /// Item has already been sold and cannot be swapped or bought.
    ///
    /// ## When This Occurs
    /// - Initiating a swap with a sold item on either side
    /// - Buying a sold item
    /// - Settling a swap whose item was sold by a concurrent settlement
    #[error("Item {0} has already been sold")]
    ItemAlreadySold(String),

    /// Initiator offered an item they do not own.
    #[error("User {user_id} is not the owner of item {item_id}")]
    NotItemOwner { item_id: String, user_id: String },

    /// Initiator targeted one of their own items.
    #[error("You cannot swap with your own item: {item_id}")]
    SelfSwap { item_id: String },

    /// Same offer already exists for this target item.
    #[error("You have already initiated a swap request for item {item2_id} with item {item1_id}")]
    DuplicateSwapRequest { item1_id: String, item2_id: String },

    /// One side of an existing swap request no longer resolves.
    #[error("Swap item {0} is no longer available")]
    SwapItemUnavailable(String),

    /// The swap request is not in a state that allows the operation.
    ///
    /// ## User Workflow
    /// ```text
    /// Request: AwaitingBalance
    ///      │
    ///      ▼
    /// reject() → SwapEvent::Reject
    ///      │
    ///      ▼
    /// InvalidSwapTransition { from: AwaitingBalance, event: Reject }
    /// ```
    #[error("Swap request is {from:?}, cannot apply {event:?}")]
    InvalidSwapTransition { from: SwapState, event: SwapEvent },

    /// Another accepted request already holds the target item while its
    /// balance is paid.
    #[error("Item {0} is already held by an accepted swap awaiting payment")]
    ItemAwaitingBalance(String),

    /// Submitted amount does not cover what is owed.
    #[error("Amount too low: {required} required, {offered} offered")]
    InsufficientAmount { required: Money, offered: Money },

    /// Caller is not the party owing a balance on this swap.
    #[error("You do not have any balance owed on this swap")]
    NoBalanceOwed,

    /// Buyer attempted to purchase their own listing.
    #[error("You cannot buy your own item: {0}")]
    CannotBuyOwnItem(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for transport.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ItemNotFound(_)
            | CoreError::UserNotFound(_)
            | CoreError::SwapNotFound(_)
            | CoreError::CategoryNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::BadRequest,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientAmount {
            required: Money::from_cents(5_000),
            offered: Money::from_cents(4_000),
        };
        assert_eq!(
            err.to_string(),
            "Amount too low: $50.00 required, $40.00 offered"
        );

        let err = CoreError::InvalidSwapTransition {
            from: SwapState::AwaitingBalance,
            event: SwapEvent::Reject,
        };
        assert_eq!(
            err.to_string(),
            "Swap request is AwaitingBalance, cannot apply Reject"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CoreError::ItemNotFound("i1".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::SwapNotFound("s1".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CoreError::NoBalanceOwed.kind(), ErrorKind::BadRequest);
        assert_eq!(
            CoreError::ItemAwaitingBalance("i2".to_string()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            CoreError::SelfSwap {
                item_id: "i2".to_string()
            }
            .kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::BadRequest);
    }
}
