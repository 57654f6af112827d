//! # Session Carts
//!
//! Sale and purchase-order drafts held by the calling session.
//!
//! A cart is a plain value: the caller owns it (one per clerk session,
//! per HTTP request, per UI window) and hands it to the ledger when the
//! clerk finalizes. Nothing here is shared or global.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleCart::new()                                                        │
//! │     │                                                                   │
//! │     ├── add(&product, qty)      merge by product, cap at seen stock     │
//! │     ├── set_quantity(id, qty)   0 removes the line                      │
//! │     ├── remove(id) / clear()                                            │
//! │     ├── total()                 preview, promo-aware                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  into_sale_request(client, method, status) ──► Ledger::record_sale      │
//! │                                                 (re-validates all)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ledger::{
    resolve_unit_price, PurchaseOrderLineRequest, PurchaseOrderRequest, SaleLineRequest,
    SaleRequest,
};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Product, SaleStatus};

// =============================================================================
// Sale Cart
// =============================================================================

/// A line of a sale cart.
///
/// `unit_price` and `available` are what the product looked like when it
/// was added; the ledger looks again at finalize time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCartLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub available: Quantity,
}

impl SaleCartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Sale in progress.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every line quantity is > 0 and ≤ the stock seen when it was added
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleCart {
    lines: Vec<SaleCartLine>,
}

impl SaleCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `product`, merging with an existing line.
    ///
    /// The merged quantity is capped at the product's stock. Returns the
    /// resulting line quantity.
    pub fn add(&mut self, product: &Product, quantity: Quantity) -> CoreResult<Quantity> {
        if !quantity.is_positive() {
            return Err(CoreError::invalid("quantity must be positive"));
        }
        let stock = product.stock();
        if !stock.is_positive() {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: stock,
                requested: quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.available = stock;
            line.unit_price = resolve_unit_price(product);
            line.quantity = (line.quantity + quantity).min(stock);
            return Ok(line.quantity);
        }

        let line = SaleCartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: quantity.min(stock),
            unit_price: resolve_unit_price(product),
            available: stock,
        };
        let added = line.quantity;
        self.lines.push(line);
        Ok(added)
    }

    /// Sets the quantity of a line. Zero removes it; the value is capped at
    /// the stock seen for the product.
    pub fn set_quantity(&mut self, product_id: &str, quantity: Quantity) -> CoreResult<()> {
        if quantity.is_negative() {
            return Err(CoreError::invalid("quantity must not be negative"));
        }
        if quantity.is_zero() {
            return self.remove(product_id);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        line.quantity = quantity.min(line.available);
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[SaleCartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Preview of the sale total.
    pub fn total(&self) -> Money {
        self.lines.iter().map(SaleCartLine::line_total).sum()
    }

    /// Consumes the cart into a ledger request.
    pub fn into_sale_request(
        self,
        client_id: Option<String>,
        payment_method: impl Into<String>,
        status: SaleStatus,
    ) -> CoreResult<SaleRequest> {
        if self.lines.is_empty() {
            return Err(CoreError::invalid("cart is empty"));
        }
        Ok(SaleRequest {
            client_id,
            payment_method: payment_method.into(),
            status,
            lines: self
                .lines
                .into_iter()
                .map(|l| SaleLineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        })
    }
}

// =============================================================================
// Order Cart
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCartLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_cost: Money,
}

/// Purchase order in progress.
///
/// Lines may sit at quantity zero while the buyer is still filling the
/// order in; they are dropped on conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCart {
    lines: Vec<OrderCartLine>,
}

impl OrderCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `product` at its current purchase price.
    ///
    /// Returns `false` (and changes nothing) when the product is already
    /// in the cart.
    pub fn add(&mut self, product: &Product, quantity: Quantity) -> CoreResult<bool> {
        if quantity.is_negative() {
            return Err(CoreError::invalid("quantity must not be negative"));
        }
        if self.lines.iter().any(|l| l.product_id == product.id) {
            return Ok(false);
        }
        self.lines.push(OrderCartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_cost: product.purchase_price(),
        });
        Ok(true)
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: Quantity) -> CoreResult<()> {
        if quantity.is_negative() {
            return Err(CoreError::invalid("quantity must not be negative"));
        }
        self.line_mut(product_id)?.quantity = quantity;
        Ok(())
    }

    /// Overrides the agreed unit cost of a line.
    pub fn set_unit_cost(&mut self, product_id: &str, unit_cost: Money) -> CoreResult<()> {
        if unit_cost.is_negative() {
            return Err(CoreError::invalid("unit cost must not be negative"));
        }
        self.line_mut(product_id)?.unit_cost = unit_cost;
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OrderCartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.unit_cost.times(l.quantity)).sum()
    }

    /// Consumes the cart into a purchase-order request, dropping lines
    /// still at quantity zero.
    pub fn into_purchase_order_request(
        self,
        supplier_id: impl Into<String>,
    ) -> CoreResult<PurchaseOrderRequest> {
        let lines: Vec<PurchaseOrderLineRequest> = self
            .lines
            .into_iter()
            .filter(|l| l.quantity.is_positive())
            .map(|l| PurchaseOrderLineRequest {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_cost: l.unit_cost,
            })
            .collect();
        if lines.is_empty() {
            return Err(CoreError::invalid("order has no line with a quantity"));
        }
        Ok(PurchaseOrderRequest {
            supplier_id: supplier_id.into(),
            lines,
        })
    }

    fn line_mut(&mut self, product_id: &str) -> CoreResult<&mut OrderCartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }
}
