//! # Domain Types
//!
//! Core domain types used throughout Ironmonger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                        Ledger records                          │
//! │  ┌─────────────────┐            ┌─────────────────┐                     │
//! │  │    Product      │◄───────────│    SaleItem     │  unit price frozen  │
//! │  │  prices, stock  │            │  (snapshot)     │  at sale time       │
//! │  └────────┬────────┘            └────────┬────────┘                     │
//! │           │                              │ N:1                          │
//! │  ┌────────┴────────┐            ┌────────┴────────┐   ┌──────────────┐  │
//! │  │    Supplier     │            │      Sale       │──►│    Client    │  │
//! │  └────────┬────────┘            │  paid | credit  │   └──────────────┘  │
//! │           │                     └─────────────────┘                     │
//! │  ┌────────┴────────────┐        ┌─────────────────────┐                 │
//! │  │   PurchaseOrder     │◄───────│ PurchaseOrderItem   │                 │
//! │  │ pending | received  │        └─────────────────────┘                 │
//! │  └─────────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Shape
//! Entity structs mirror their table rows: monetary columns are raw cents
//! (`*_cents`) and quantities raw thousandths (`*_milli`). Accessors return
//! the typed [`Money`] and [`Quantity`] values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Product
// =============================================================================

/// A product of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name shown at the counter and on invoices.
    pub name: String,

    /// Catalog category ("Plumbing", "Electrical", ...).
    pub category: Option<String>,

    /// Unit label ("piece", "m", "kg").
    pub unit: Option<String>,

    /// What the store pays the supplier, in cents.
    pub purchase_price_cents: i64,

    /// Standard shelf price, in cents.
    pub selling_price_cents: i64,

    /// Promotional price, in cents. Only used when positive.
    pub promo_price_cents: Option<i64>,

    /// Current stock in thousandths of a unit. Never negative.
    pub stock_milli: i64,

    /// Usual supplier of this product.
    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    #[inline]
    pub fn promo_price(&self) -> Option<Money> {
        self.promo_price_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn stock(&self) -> Quantity {
        Quantity::from_milli(self.stock_milli)
    }

    /// The price a sale captures for this product right now.
    ///
    /// Promo price when present and positive, otherwise the selling price.
    pub fn effective_price(&self) -> Money {
        match self.promo_price() {
            Some(promo) if promo.is_positive() => promo,
            _ => self.selling_price(),
        }
    }

    /// Checks whether `quantity` can be taken out of the current stock.
    pub fn can_sell(&self, quantity: Quantity) -> bool {
        quantity.is_positive() && quantity <= self.stock()
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Explicit SKU. When `None` the repository derives one from the name.
    pub sku: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub promo_price: Option<Money>,
    /// Stock on hand when the product enters the catalog.
    pub opening_stock: Quantity,
    pub supplier_id: Option<String>,
}

/// Partial product update. Only `Some` fields are written.
///
/// Stock is deliberately absent: after creation it only moves through the
/// ledger (sales and purchase-order receptions).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub purchase_price: Option<Money>,
    pub selling_price: Option<Money>,
    pub promo_price: Option<Money>,
    pub supplier_id: Option<String>,
}

impl ProductPatch {
    /// Applies the provided fields to `product`, leaving the others intact.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = Some(category.clone());
        }
        if let Some(unit) = &self.unit {
            product.unit = Some(unit.clone());
        }
        if let Some(price) = self.purchase_price {
            product.purchase_price_cents = price.cents();
        }
        if let Some(price) = self.selling_price {
            product.selling_price_cents = price.cents();
        }
        if let Some(price) = self.promo_price {
            product.promo_price_cents = Some(price.cents());
        }
        if let Some(supplier_id) = &self.supplier_id {
            product.supplier_id = Some(supplier_id.clone());
        }
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial supplier update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn apply(&self, supplier: &mut Supplier) {
        if let Some(name) = &self.name {
            supplier.name = name.clone();
        }
        if let Some(contact) = &self.contact_person {
            supplier.contact_person = Some(contact.clone());
        }
        if let Some(phone) = &self.phone {
            supplier.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            supplier.email = Some(email.clone());
        }
        if let Some(address) = &self.address {
            supplier.address = Some(address.clone());
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Whether a client is a private person or a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    #[default]
    Individual,
    Business,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub kind: ClientKind,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Tax identification number (business clients).
    pub tax_id: Option<String>,
    /// Statistical registration number (business clients).
    pub stat_number: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub kind: ClientKind,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub stat_number: Option<String>,
}

/// Partial client update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub kind: Option<ClientKind>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub stat_number: Option<String>,
}

impl ClientPatch {
    pub fn apply(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(kind) = self.kind {
            client.kind = kind;
        }
        if let Some(phone) = &self.phone {
            client.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            client.email = Some(email.clone());
        }
        if let Some(address) = &self.address {
            client.address = Some(address.clone());
        }
        if let Some(tax_id) = &self.tax_id {
            client.tax_id = Some(tax_id.clone());
        }
        if let Some(stat) = &self.stat_number {
            client.stat_number = Some(stat.clone());
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Payment status of a sale.
///
/// The only transition is `Credit → Paid` (settlement).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Paid at the counter (or settled later).
    #[default]
    Paid,
    /// Goods left the store, money is still owed.
    Credit,
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub client_id: Option<String>,
    /// Free-form label: "Cash", "Card", "Mobile money", "Credit"...
    pub payment_method: String,
    pub status: SaleStatus,
    /// Σ line totals, computed once when the sale is recorded.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    /// When a credit sale was settled.
    #[ts(as = "Option<String>")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_credit(&self) -> bool {
        self.status == SaleStatus::Credit
    }
}

/// A line of a sale. Immutable snapshot taken at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity_milli: i64,
    /// Unit price at time of sale (frozen, promo-aware).
    pub unit_price_cents: i64,
    /// unit price × quantity.
    pub line_total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A sale together with its line items, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Purchase Order
// =============================================================================

/// Status of a purchase order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    /// Ordered from the supplier, goods not yet in the store.
    #[default]
    Pending,
    /// Goods received; stock has been incremented.
    Received,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    pub status: PurchaseOrderStatus,
    /// Σ line totals, fixed at creation.
    pub total_cost_cents: i64,
    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn is_received(&self) -> bool {
        self.status == PurchaseOrderStatus::Received
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity_milli: i64,
    /// Agreed purchase price per unit.
    pub unit_cost_cents: i64,
    pub line_total_cents: i64,
}

impl PurchaseOrderItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }
}

/// A purchase order together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderRecord {
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
