//! # Ledger Planning
//!
//! Pure half of the inventory ledger: turns a request plus the products it
//! references into a fully priced plan, or a typed rejection. The database
//! crate loads the products inside its transaction, calls into here, and
//! only writes when planning succeeded.
//!
//! ## Sale Flow
//! ```text
//! SaleRequest ──► plan_sale(request, products) ──► SalePlan
//!                   │                               ├── lines (frozen prices)
//!                   │                               ├── stock decrements
//!                   │                               └── total = Σ line totals
//!                   │
//!                   ├── no lines / qty ≤ 0   → InvalidRequest
//!                   ├── unknown product       → ProductNotFound
//!                   └── qty > stock left      → InsufficientStock
//! ```
//!
//! Lines are checked in request order. Several lines naming the same
//! product draw from the same remaining stock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Product, SaleStatus};
use crate::validation::{validate_payment_method, validate_price};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: Quantity,
}

/// Everything needed to record a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub client_id: Option<String>,
    pub payment_method: String,
    pub status: SaleStatus,
    pub lines: Vec<SaleLineRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLineRequest {
    pub product_id: String,
    pub quantity: Quantity,
    /// Agreed purchase price per unit, accepted as given.
    pub unit_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderRequest {
    pub supplier_id: String,
    pub lines: Vec<PurchaseOrderLineRequest>,
}

// =============================================================================
// Plans
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSaleLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A validated, priced sale ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SalePlan {
    pub lines: Vec<PlannedSaleLine>,
    pub total: Money,
}

impl SalePlan {
    /// Total quantity to take out of stock per product.
    pub fn stock_decrements(&self) -> HashMap<&str, Quantity> {
        let mut out: HashMap<&str, Quantity> = HashMap::new();
        for line in &self.lines {
            *out.entry(line.product_id.as_str()).or_default() += line.quantity;
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOrderLine {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderPlan {
    pub lines: Vec<PlannedOrderLine>,
    pub total_cost: Money,
}

// =============================================================================
// Pricing
// =============================================================================

/// Unit price a sale line captures for `product`.
///
/// Promo price if present and strictly positive, else the selling price.
#[inline]
pub fn resolve_unit_price(product: &Product) -> Money {
    product.effective_price()
}

// =============================================================================
// Planning
// =============================================================================

/// Checks the request-level shape: lines present, payment method set.
///
/// Per-line checks (quantity, product, stock) run in request order inside
/// [`plan_sale`].
pub fn check_sale_request(request: &SaleRequest) -> CoreResult<()> {
    if request.lines.is_empty() {
        return Err(CoreError::invalid("a sale needs at least one line"));
    }
    validate_payment_method(&request.payment_method)?;
    Ok(())
}

/// Plans a sale against the current state of the referenced products.
///
/// `products` must hold every product the request names that still
/// exists; a missing entry means the product is unknown.
///
/// Each line is checked in turn: quantity > 0, product exists, stock left.
/// The first failing line decides the error.
pub fn plan_sale(request: &SaleRequest, products: &HashMap<String, Product>) -> CoreResult<SalePlan> {
    check_sale_request(request)?;

    let mut remaining: HashMap<&str, Quantity> = HashMap::new();
    let mut lines = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        check_line_quantity(&line.product_id, line.quantity)?;

        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let available = remaining
            .entry(product.id.as_str())
            .or_insert_with(|| product.stock());
        if line.quantity > *available {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: *available,
                requested: line.quantity,
            });
        }
        *available -= line.quantity;

        let unit_price = resolve_unit_price(product);
        lines.push(PlannedSaleLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: line.quantity,
            unit_price,
            line_total: line_total(&product.id, unit_price, line.quantity)?,
        });
    }

    let total = sum_line_totals(lines.iter().map(|l| l.line_total))?;
    Ok(SalePlan { lines, total })
}

/// Plans a purchase order. Quantities and costs are taken as given; only
/// their shape and the existence of the products are checked.
pub fn plan_purchase_order(
    request: &PurchaseOrderRequest,
    products: &HashMap<String, Product>,
) -> CoreResult<PurchaseOrderPlan> {
    if request.supplier_id.trim().is_empty() {
        return Err(CoreError::invalid("a purchase order needs a supplier"));
    }
    if request.lines.is_empty() {
        return Err(CoreError::invalid("a purchase order needs at least one line"));
    }

    let mut lines = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        check_line_quantity(&line.product_id, line.quantity)?;
        validate_price("unit_cost", line.unit_cost)?;
        if !products.contains_key(&line.product_id) {
            return Err(CoreError::ProductNotFound(line.product_id.clone()));
        }
        lines.push(PlannedOrderLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_cost: line.unit_cost,
            line_total: line_total(&line.product_id, line.unit_cost, line.quantity)?,
        });
    }

    let total_cost = sum_line_totals(lines.iter().map(|l| l.line_total))?;
    Ok(PurchaseOrderPlan { lines, total_cost })
}

fn check_line_quantity(product_id: &str, quantity: Quantity) -> CoreResult<()> {
    if !quantity.is_positive() {
        return Err(CoreError::invalid(format!(
            "quantity for product {} must be positive, got {}",
            product_id, quantity
        )));
    }
    Ok(())
}

fn line_total(product_id: &str, unit_price: Money, quantity: Quantity) -> CoreResult<Money> {
    unit_price.checked_times(quantity).ok_or_else(|| {
        CoreError::invalid(format!(
            "line total for product {} is out of range ({} × {})",
            product_id, unit_price, quantity
        ))
    })
}

fn sum_line_totals(totals: impl Iterator<Item = Money>) -> CoreResult<Money> {
    Money::checked_sum(totals).ok_or_else(|| CoreError::invalid("total is out of range"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn product(id: &str, selling: i64, promo: Option<i64>, stock: Quantity) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            category: None,
            unit: None,
            purchase_price_cents: selling / 2,
            selling_price_cents: selling,
            promo_price_cents: promo,
            stock_milli: stock.milli(),
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog(items: Vec<Product>) -> HashMap<String, Product> {
        items.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    fn sale(lines: Vec<(&str, Quantity)>) -> SaleRequest {
        SaleRequest {
            client_id: None,
            payment_method: "Cash".to_string(),
            status: SaleStatus::Paid,
            lines: lines
                .into_iter()
                .map(|(id, quantity)| SaleLineRequest {
                    product_id: id.to_string(),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_plan_sale_basic() {
        let products = catalog(vec![product("p", 10_000, None, Quantity::from_units(10))]);
        let plan = plan_sale(&sale(vec![("p", Quantity::from_units(3))]), &products).unwrap();

        assert_eq!(plan.total, Money::from_cents(30_000));
        assert_eq!(plan.lines[0].unit_price, Money::from_cents(10_000));
        assert_eq!(plan.stock_decrements()["p"], Quantity::from_units(3));
    }

    #[test]
    fn test_plan_sale_insufficient_stock() {
        let products = catalog(vec![product("p", 10_000, None, Quantity::from_units(5))]);
        let err = plan_sale(&sale(vec![("p", Quantity::from_units(8))]), &products).unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: "Product p".to_string(),
                available: Quantity::from_units(5),
                requested: Quantity::from_units(8),
            }
        );
    }

    #[test]
    fn test_plan_sale_duplicate_lines_share_stock() {
        let products = catalog(vec![product("p", 100, None, Quantity::from_units(5))]);
        let request = sale(vec![("p", Quantity::from_units(3)), ("p", Quantity::from_units(3))]);

        let err = plan_sale(&request, &products).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available, .. } if available == Quantity::from_units(2)
        ));
    }

    #[test]
    fn test_plan_sale_checks_lines_in_order() {
        let products = catalog(vec![product("a", 100, None, Quantity::from_units(1))]);
        let request = sale(vec![("a", Quantity::from_units(2)), ("ghost", Quantity::from_units(1))]);

        assert!(matches!(
            plan_sale(&request, &products),
            Err(CoreError::InsufficientStock { .. })
        ));

        let request = sale(vec![("ghost", Quantity::from_units(1)), ("a", Quantity::from_units(2))]);
        assert_eq!(
            plan_sale(&request, &products),
            Err(CoreError::ProductNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_plan_sale_rejects_bad_shape() {
        let products = catalog(vec![product("p", 100, None, Quantity::from_units(5))]);

        assert!(matches!(
            plan_sale(&sale(vec![]), &products),
            Err(CoreError::InvalidRequest { .. })
        ));
        assert!(matches!(
            plan_sale(&sale(vec![("p", Quantity::zero())]), &products),
            Err(CoreError::InvalidRequest { .. })
        ));

        let mut request = sale(vec![("p", Quantity::from_units(1))]);
        request.payment_method = "  ".to_string();
        assert!(matches!(plan_sale(&request, &products), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_plan_sale_quantity_checked_in_line_order() {
        let products = catalog(vec![product("p", 100, None, Quantity::from_units(5))]);

        let request = sale(vec![("ghost", Quantity::from_units(1)), ("p", Quantity::zero())]);
        assert_eq!(
            plan_sale(&request, &products),
            Err(CoreError::ProductNotFound("ghost".to_string()))
        );

        let request = sale(vec![("p", Quantity::zero()), ("ghost", Quantity::from_units(1))]);
        assert!(matches!(
            plan_sale(&request, &products),
            Err(CoreError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_plan_sale_rejects_out_of_range_totals() {
        let huge = i64::MAX / 2 + 10;
        let products = catalog(vec![
            product("a", huge, None, Quantity::from_units(10)),
            product("b", huge, None, Quantity::from_units(10)),
        ]);

        // One line whose total does not fit.
        let err = plan_sale(&sale(vec![("a", Quantity::from_units(2))]), &products).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest { .. }));

        // Two lines that fit alone but not together.
        let request = sale(vec![("a", Quantity::from_units(1)), ("b", Quantity::from_units(1))]);
        assert!(matches!(
            plan_sale(&request, &products),
            Err(CoreError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_plan_sale_fractional_quantity() {
        // 2.5 m of cable at 3.99 per metre = 9.975 → 9.98
        let products = catalog(vec![product("cable", 399, None, Quantity::from_units(100))]);
        let plan = plan_sale(&sale(vec![("cable", Quantity::from_milli(2500))]), &products).unwrap();
        assert_eq!(plan.total, Money::from_cents(998));
    }

    #[test]
    fn test_plan_purchase_order() {
        let products = catalog(vec![product("p", 100, None, Quantity::zero())]);
        let request = PurchaseOrderRequest {
            supplier_id: "s-1".to_string(),
            lines: vec![PurchaseOrderLineRequest {
                product_id: "p".to_string(),
                quantity: Quantity::from_units(20),
                unit_cost: Money::from_cents(50),
            }],
        };

        let plan = plan_purchase_order(&request, &products).unwrap();
        assert_eq!(plan.total_cost, Money::from_cents(1000));

        let mut bad = request.clone();
        bad.lines[0].unit_cost = Money::from_cents(-1);
        assert!(matches!(plan_purchase_order(&bad, &products), Err(CoreError::Validation(_))));

        let mut bad = request;
        bad.lines[0].product_id = "ghost".to_string();
        assert!(plan_purchase_order(&bad, &products).unwrap_err().is_not_found());
    }

    #[test]
    fn test_plan_purchase_order_rejects_out_of_range_totals() {
        let products = catalog(vec![product("p", 100, None, Quantity::zero())]);
        let request = PurchaseOrderRequest {
            supplier_id: "s-1".to_string(),
            lines: vec![PurchaseOrderLineRequest {
                product_id: "p".to_string(),
                quantity: Quantity::from_units(2),
                unit_cost: Money::from_cents(i64::MAX / 2 + 10),
            }],
        };

        assert!(matches!(
            plan_purchase_order(&request, &products),
            Err(CoreError::InvalidRequest { .. })
        ));

        let mut split = request.clone();
        split.lines[0].quantity = Quantity::from_units(1);
        split.lines.push(split.lines[0].clone());
        assert!(matches!(
            plan_purchase_order(&split, &products),
            Err(CoreError::InvalidRequest { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_sale_total_is_sum_of_lines(
            lines in prop::collection::vec((1i64..100_000, 1i64..50_000), 1..8)
        ) {
            let products: Vec<Product> = lines
                .iter()
                .enumerate()
                .map(|(i, (price, _))| product(&i.to_string(), *price, None, Quantity::from_units(1_000)))
                .collect();
            let request = sale(
                lines
                    .iter()
                    .enumerate()
                    .map(|(i, (_, milli))| (products[i].id.as_str(), Quantity::from_milli(*milli)))
                    .collect(),
            );
            let products = catalog(products.clone());

            let plan = plan_sale(&request, &products).unwrap();
            let sum: Money = plan.lines.iter().map(|l| l.unit_price.times(l.quantity)).sum();
            prop_assert_eq!(sum, plan.total);
        }

        #[test]
        fn prop_promo_price_captured_only_when_positive(
            selling in 1i64..1_000_000,
            promo in proptest::option::of(-1_000i64..1_000_000),
        ) {
            let products = catalog(vec![product("p", selling, promo, Quantity::from_units(1))]);
            let plan = plan_sale(&sale(vec![("p", Quantity::from_units(1))]), &products).unwrap();

            let expected = match promo {
                Some(p) if p > 0 => p,
                _ => selling,
            };
            prop_assert_eq!(plan.lines[0].unit_price.cents(), expected);
        }
    }
}
