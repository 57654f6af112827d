//! # Report Folds
//!
//! Read-only aggregates over loaded entities. The database crate selects
//! the rows (a day, a year, a date range) and folds them here.
//!
//! ## Formulas
//! ```text
//! stock valuation   = Σ purchase_price × stock                (all products)
//! projected profit  = Σ (selling_price − purchase_price) × stock
//! realized profit   = Σ (line unit_price − purchase_price) × line quantity
//!                     (lines whose product is gone are skipped)
//! outstanding credit = Σ total of sales still in `credit`
//! low stock         = 0 < stock < threshold
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Product, PurchaseOrder, Sale, SaleItem};

// =============================================================================
// Report Types
// =============================================================================

/// Revenue and number of sales for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySummary {
    pub revenue: Money,
    pub sale_count: u32,
}

/// One bucket of the monthly revenue histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyRevenue {
    /// 1 = January.
    pub month: u32,
    pub revenue: Money,
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardKpis {
    pub today_revenue: Money,
    pub today_sale_count: u32,
    pub stock_valuation: Money,
    pub received_purchases: Money,
}

/// Figures shown on the finance screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinanceKpis {
    pub projected_profit: Money,
    pub today_realized_profit: Money,
    pub outstanding_credit: Money,
}

// =============================================================================
// Date Helpers
// =============================================================================

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end)` bounds covering the inclusive day range
/// `from..=to`.
pub fn range_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = match to.succ_opt() {
        Some(next) => day_start(next),
        None => DateTime::<Utc>::MAX_UTC,
    };
    (day_start(from), end)
}

// =============================================================================
// Folds
// =============================================================================

pub fn daily_summary<'a>(sales: impl IntoIterator<Item = &'a Sale>, day: NaiveDate) -> DailySummary {
    sales
        .into_iter()
        .filter(|s| s.sold_at.date_naive() == day)
        .fold(DailySummary::default(), |mut acc, s| {
            acc.revenue += s.total();
            acc.sale_count += 1;
            acc
        })
}

pub fn stock_valuation<'a>(products: impl IntoIterator<Item = &'a Product>) -> Money {
    products
        .into_iter()
        .map(|p| p.purchase_price().times(p.stock()))
        .sum()
}

pub fn projected_profit<'a>(products: impl IntoIterator<Item = &'a Product>) -> Money {
    products
        .into_iter()
        .map(|p| (p.selling_price() - p.purchase_price()).times(p.stock()))
        .sum()
}

pub fn received_purchases_total<'a>(orders: impl IntoIterator<Item = &'a PurchaseOrder>) -> Money {
    orders
        .into_iter()
        .filter(|o| o.is_received())
        .map(PurchaseOrder::total_cost)
        .sum()
}

pub fn outstanding_credit<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Money {
    sales
        .into_iter()
        .filter(|s| s.is_credit())
        .map(Sale::total)
        .sum()
}

/// Products with some stock left, but less than `threshold`.
pub fn low_stock<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    threshold: Quantity,
) -> Vec<&'a Product> {
    products
        .into_iter()
        .filter(|p| p.stock().is_positive() && p.stock() < threshold)
        .collect()
}

/// Twelve buckets, January first, for sales made during `year`.
pub fn monthly_revenue<'a>(sales: impl IntoIterator<Item = &'a Sale>, year: i32) -> Vec<MonthlyRevenue> {
    let mut buckets: Vec<MonthlyRevenue> = (1..=12)
        .map(|month| MonthlyRevenue {
            month,
            revenue: Money::zero(),
        })
        .collect();
    for sale in sales {
        if sale.sold_at.year() != year {
            continue;
        }
        let index = sale.sold_at.month0() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.revenue += sale.total();
        }
    }
    buckets
}

/// Profit actually made on `items`, priced against today's purchase price.
pub fn realized_profit<'a>(
    items: impl IntoIterator<Item = &'a SaleItem>,
    products: &HashMap<String, Product>,
) -> Money {
    items
        .into_iter()
        .filter_map(|item| {
            let product = products.get(&item.product_id)?;
            Some((item.unit_price() - product.purchase_price()).times(item.quantity()))
        })
        .sum()
}
