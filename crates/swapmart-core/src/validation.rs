//! # Validation Module
//!
//! Input validation for marketplace operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer                                                   │
//! │  └── Deserialization, sanitization                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine / repositories                                        │
//! │  └── THIS MODULE: field rules (names, prices, amounts, pages)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (price_cents >= 0), CHECK (state IN (...))                  │
//! │  ├── UNIQUE (initiator_id, item2_id), UNIQUE (categories.name)         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use swapmart_core::validation::{validate_amount_cents, validate_item_name};
//!
//! validate_item_name("Vintage bicycle").unwrap();
//! validate_amount_cents(5_000).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::Page;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates and normalizes a category name.
///
/// Categories are compared case-insensitively, so the stored form is the
/// trimmed upper-case name.
///
/// ## Example
/// ```rust
/// use swapmart_core::validation::normalize_category_name;
///
/// assert_eq!(normalize_category_name("  books ").unwrap(), "BOOKS");
/// assert!(normalize_category_name("").is_err());
/// ```
pub fn normalize_category_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if name.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '&')
    {
        return Err(ValidationError::InvalidFormat {
            field: "category".to_string(),
            reason: "must contain only letters, numbers, spaces, '-', '_' and '&'".to_string(),
        });
    }

    Ok(name.to_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed.
///
/// ## Example
/// ```rust
/// use swapmart_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a submitted payment amount in cents.
///
/// Zero is allowed: an owner may settle a swap whose difference is already
/// covered, and the balance rule rejects anything short.
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates pagination input and fills in the default page size.
///
/// ## Rules
/// - `limit` of 0 means "use `default_limit`"
/// - `limit` must not exceed `max_limit`
/// - `page` is 1-based
pub fn validate_page(
    limit: u32,
    page: u32,
    default_limit: u32,
    max_limit: u32,
) -> ValidationResult<Page> {
    let limit = if limit == 0 { default_limit } else { limit };

    if limit > max_limit {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: max_limit as i64,
        });
    }

    if page == 0 {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: u32::MAX as i64,
        });
    }

    Ok(Page::new(limit, page))
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use swapmart_core::validation::validate_uuid;
///
/// assert!(validate_uuid("swap id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("swap id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Road bike").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_normalize_category_name() {
        assert_eq!(normalize_category_name("Home & Garden").unwrap(), "HOME & GARDEN");
        assert_eq!(normalize_category_name("books").unwrap(), "BOOKS");
        assert!(normalize_category_name("drop;table").is_err());
        assert!(normalize_category_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_amount_cents(0).is_ok());
        assert!(validate_amount_cents(5_000).is_ok());
        assert!(matches!(
            validate_amount_cents(-5_000),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_page() {
        let page = validate_page(0, 1, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert_eq!(page, Page::new(DEFAULT_PAGE_SIZE, 1));

        let page = validate_page(5, 3, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert_eq!(page.offset(), 10);

        assert!(validate_page(MAX_PAGE_SIZE + 1, 1, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).is_err());
        assert!(validate_page(10, 0, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
