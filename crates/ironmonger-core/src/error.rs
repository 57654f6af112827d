//! # Error Types
//!
//! Domain-specific error types for ironmonger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ironmonger-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations (NotFound,             │
//! │  │                      InsufficientStock, InvalidRequest)              │
//! │  └── ValidationError  - Input shape failures                            │
//! │                                                                         │
//! │  ironmonger-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── LedgerError      - Rejected(CoreError) | Store(DbError)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A ledger operation that fails with one of these has not mutated anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Purchase order not found: {0}")]
    PurchaseOrderNotFound(String),

    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Requested quantity exceeds the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale line: "PVC pipe 40mm" × 8
    ///      │
    ///      ▼
    /// Check stock: available = 5
    ///      │
    ///      ▼
    /// InsufficientStock { product: "PVC pipe 40mm", available: 5, requested: 8 }
    ///      │
    ///      ▼
    /// Whole sale aborted, no stock touched
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product name, as shown to the clerk.
        product: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Structurally invalid input (empty line list, non-positive quantity...).
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CoreError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// True for every "referenced entity absent" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::PurchaseOrderNotFound(_)
                | CoreError::SupplierNotFound(_)
                | CoreError::ClientNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;
