//! # Error Types
//!
//! Domain-specific error types for sona-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sona-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sona-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller; DbError stays in sona-db  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, quantities, bounds)
//! 3. Errors are enum variants, never String
//! 4. Validation errors are raised BEFORE any write, so they can never
//!    leave partial state behind

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They block the
/// operation synchronously and should be translated to user-facing
/// messages by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A return or exchange was confirmed with nothing selected.
    ///
    /// ## When This Occurs
    /// - The operator presses confirm on the selection step without
    ///   ticking any line of the original sale
    #[error("No items selected for return or exchange")]
    NoItemsSelected,

    /// An exchange was confirmed without any replacement items.
    #[error("Exchange requires at least one replacement item")]
    NoReplacementItems,

    /// A line item quantity change below the minimum of one unit.
    ///
    /// The mutator leaves the item untouched when this is returned.
    #[error("Quantity {requested} is invalid, must be at least 1")]
    InvalidQuantity { requested: i64 },

    /// Return quantity outside `[1, max_quantity]`.
    #[error("Return quantity {requested} out of range, must be between 1 and {max}")]
    ReturnQuantityOutOfRange { requested: i64, max: i64 },

    /// Selector index does not exist.
    #[error("No selection entry at index {index}")]
    EntryNotFound { index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when raw input doesn't meet requirements.
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

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
        let err = CoreError::ReturnQuantityOutOfRange {
            requested: 7,
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "Return quantity 7 out of range, must be between 1 and 4"
        );

        assert_eq!(
            CoreError::NoItemsSelected.to_string(),
            "No items selected for return or exchange"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "weight".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
