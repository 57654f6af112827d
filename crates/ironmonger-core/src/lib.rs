//! # ironmonger-core: Pure Business Logic for Ironmonger
//!
//! Everything the hardware-store ledger decides without touching storage:
//! prices, totals, stock checks, carts, report folds.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ironmonger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │           Callers (REST handlers, counter UI, scripts)          │    │
//! │  │       SaleCart / OrderCart owned per session, then finalize     │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 ironmonger-db (Ledger + repos)                  │    │
//! │  │      one writer lock + one transaction per ledger operation     │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ plan_sale / plan_purchase_order        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │             ★ ironmonger-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐   │    │
//! │  │   │  types  │ │  money  │ │ ledger  │ │  cart   │ │ report  │   │    │
//! │  │   │quantity │ │ markup  │ │planning │ │sessions │ │  folds  │   │    │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use ironmonger_core::{Money, Quantity};
//!
//! // 2.5 m of cable at 3.99 per metre
//! let line = Money::from_cents(399).times(Quantity::from_milli(2500));
//! assert_eq!(line.cents(), 998);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod quantity;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{OrderCart, SaleCart};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{
    PurchaseOrderLineRequest, PurchaseOrderRequest, SaleLineRequest, SaleRequest,
};
pub use money::{MarkupRate, Money};
pub use quantity::Quantity;
pub use report::{DailySummary, DashboardKpis, FinanceKpis, MonthlyRevenue};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level under which a product shows up in the low-stock report,
/// unless the store configuration says otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: Quantity = Quantity::from_units(10);

/// Payment label written on a credit sale until it is settled.
pub const CREDIT_PAYMENT_METHOD: &str = "Credit";
