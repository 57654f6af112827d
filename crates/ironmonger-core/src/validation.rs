//! # Validation Module
//!
//! Input validation for catalog records and ledger requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (REST handler / UI form)                               │
//! │  └── Shape checks, immediate feedback                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + ledger planning                                 │
//! │  ├── Names, SKUs, prices, quantities re-checked                         │
//! │  └── Stock and existence rules (ledger)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY                                    │
//! │  └── CHECK (stock_milli >= 0)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{NewClient, NewProduct, NewSupplier};

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_LABEL_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use ironmonger_core::validation::validate_sku;
///
/// assert!(validate_sku("HAM-0001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name (product, supplier, client).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a payment method label ("Cash", "Card", "Credit"...).
pub fn validate_payment_method(method: &str) -> ValidationResult<()> {
    let method = method.trim();

    if method.is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    if method.len() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: "payment_method".to_string(),
            max: MAX_LABEL_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity. Must be strictly positive.
pub fn validate_quantity(quantity: Quantity) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price. Zero is allowed (free items, gifts).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    if let Some(sku) = &input.sku {
        validate_sku(sku)?;
    }
    validate_name("name", &input.name)?;
    validate_price("purchase_price", input.purchase_price)?;
    validate_price("selling_price", input.selling_price)?;
    if let Some(promo) = input.promo_price {
        validate_price("promo_price", promo)?;
    }
    if input.opening_stock.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_stock".to_string(),
        });
    }
    Ok(())
}

pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<()> {
    validate_name("name", &input.name)
}

pub fn validate_new_client(input: &NewClient) -> ValidationResult<()> {
    validate_name("name", &input.name)
}

// =============================================================================
// SKU Derivation
// =============================================================================

/// Builds a SKU from a product name and a sequence number.
///
/// First three alphanumeric characters of the name, upper-cased and padded
/// with `X`, then a four-digit sequence.
///
/// ```rust
/// use ironmonger_core::validation::derive_sku;
///
/// assert_eq!(derive_sku("Claw hammer", 7), "CLA-0007");
/// assert_eq!(derive_sku("3m tape", 12), "3MT-0012");
/// assert_eq!(derive_sku("Ax", 1), "AXX-0001");
/// ```
pub fn derive_sku(name: &str, sequence: u32) -> String {
    let mut prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < 3 {
        prefix.push('X');
    }
    format!("{}-{:04}", prefix, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("CLA-0001").is_ok());
        assert!(validate_sku("pipe_40").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Wood screws 4x40").is_ok());
        assert!(validate_name("name", "  ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_quantity(Quantity::from_milli(1)).is_ok());
        assert!(validate_quantity(Quantity::zero()).is_err());
        assert!(validate_quantity(Quantity::from_units(-2)).is_err());

        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_payment_method() {
        assert!(validate_payment_method("Cash").is_ok());
        assert!(validate_payment_method("").is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut input = NewProduct {
            sku: None,
            name: "Padlock 40mm".to_string(),
            category: None,
            unit: None,
            purchase_price: Money::from_cents(800),
            selling_price: Money::from_cents(1200),
            promo_price: None,
            opening_stock: Quantity::from_units(4),
            supplier_id: None,
        };
        assert!(validate_new_product(&input).is_ok());

        input.opening_stock = Quantity::from_units(-1);
        assert!(matches!(
            validate_new_product(&input),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_derive_sku() {
        assert_eq!(derive_sku("Claw hammer", 1), "CLA-0001");
        assert_eq!(derive_sku("  é-x", 42), "XXX-0042");
        assert_eq!(derive_sku("", 3), "XXX-0003");
    }
}
