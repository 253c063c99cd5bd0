//! # Error Types
//!
//! Domain-specific error types for olivier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  olivier-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  olivier-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ServiceError     - Unified service boundary error                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, status, minimum)
//! 3. Errors are enum variants, never String
//! 4. Minimum-quantity failures carry EVERY offending line, so a
//!    multi-line cart is corrected in one pass, not one resubmission
//!    per violation

use thiserror::Error;

use crate::cart::MinimumQuantityViolation;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The pricing engine
/// itself never raises them: it is a total function, and everything it
/// consumes has been validated here first.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is not present in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotInCart(String),

    /// Submission attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// One or more cart lines are below their product's minimum order
    /// quantity. All violations are reported together.
    #[error("Minimum order quantities not met: {}", format_violations(.0))]
    MinimumQuantities(Vec<MinimumQuantityViolation>),

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line edits are only permitted while the order is pending.
    ///
    /// ## When This Occurs
    /// - Replacing the line set of a validated/shipped/delivered order
    /// - Editing a cancelled order
    #[error("Order {order_id} is {status:?}, lines can no longer be edited")]
    OrderNotEditable {
        order_id: String,
        status: OrderStatus,
    },

    /// A status change was attempted without the required privilege.
    ///
    /// Only `pending → cancelled` is open to the submitting commercial;
    /// everything else requires an administrator.
    #[error("Status change {from:?} → {to:?} requires administrator privilege")]
    StatusChangeForbidden { from: OrderStatus, to: OrderStatus },

    /// The operation is reserved to administrators.
    #[error("{operation} requires administrator privilege")]
    AdminOnly { operation: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn format_violations(violations: &[MinimumQuantityViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
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

    /// Invalid format (e.g., invalid UUID, invalid EAN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU, duplicate order number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
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
        let err = CoreError::OrderNotEditable {
            order_id: "ord-1".to_string(),
            status: OrderStatus::Delivered,
        };
        assert_eq!(
            err.to_string(),
            "Order ord-1 is Delivered, lines can no longer be edited"
        );
    }

    #[test]
    fn test_minimum_quantities_lists_every_violation() {
        let err = CoreError::MinimumQuantities(vec![
            MinimumQuantityViolation {
                product_id: "p1".to_string(),
                sku: "VIS-SER-30".to_string(),
                minimum: 6,
                quantity: 2,
            },
            MinimumQuantityViolation {
                product_id: "p2".to_string(),
                sku: "COR-LAIT-200".to_string(),
                minimum: 3,
                quantity: 1,
            },
        ]);
        let message = err.to_string();
        assert!(message.contains("VIS-SER-30"));
        assert!(message.contains("COR-LAIT-200"));
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
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
