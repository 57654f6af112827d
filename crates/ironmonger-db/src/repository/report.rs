//! # Report Repository
//!
//! Dashboard and finance figures. Each method selects the rows it needs
//! and hands them to the folds in [`ironmonger_core::report`], so the
//! formulas live in one place.
//!
//! All methods are read-only and may run concurrently with each other and
//! with ledger operations; they observe committed state only.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use ironmonger_core::report::{self, range_bounds};
use ironmonger_core::{
    DailySummary, DashboardKpis, FinanceKpis, Money, MonthlyRevenue, Product, Quantity,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::purchase_order::PurchaseOrderRepository;
use crate::repository::sale::SaleRepository;

#[derive(Debug, Clone)]
pub struct ReportRepository {
    products: ProductRepository,
    sales: SaleRepository,
    orders: PurchaseOrderRepository,
    low_stock_threshold: Quantity,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool, low_stock_threshold: Quantity) -> Self {
        ReportRepository {
            products: ProductRepository::new(pool.clone()),
            sales: SaleRepository::new(pool.clone()),
            orders: PurchaseOrderRepository::new(pool),
            low_stock_threshold,
        }
    }

    /// Revenue and sale count for one calendar day (UTC).
    pub async fn daily_summary(&self, day: NaiveDate) -> DbResult<DailySummary> {
        let sales = self.sales.list_in_range(day, day).await?;
        Ok(report::daily_summary(&sales, day))
    }

    pub async fn today_summary(&self) -> DbResult<DailySummary> {
        self.daily_summary(Utc::now().date_naive()).await
    }

    /// Σ purchase price × stock over the whole catalog.
    pub async fn stock_valuation(&self) -> DbResult<Money> {
        let products = self.products.list_all().await?;
        Ok(report::stock_valuation(&products))
    }

    /// Σ total cost of every received purchase order.
    pub async fn received_purchases_total(&self) -> DbResult<Money> {
        let orders = self.orders.list_received().await?;
        Ok(report::received_purchases_total(&orders))
    }

    /// Products under the configured threshold, but not sold out.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        self.low_stock_below(self.low_stock_threshold).await
    }

    pub async fn low_stock_below(&self, threshold: Quantity) -> DbResult<Vec<Product>> {
        let products = self.products.list_all().await?;
        Ok(report::low_stock(&products, threshold)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Twelve monthly revenue buckets for `year`.
    pub async fn monthly_revenue(&self, year: i32) -> DbResult<Vec<MonthlyRevenue>> {
        debug!(year, "Building monthly revenue");

        let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
        let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single();
        let sales = match (start, end) {
            (Some(start), Some(end)) => self.sales.list_between(start, end).await?,
            _ => Vec::new(),
        };
        Ok(report::monthly_revenue(&sales, year))
    }

    /// Profit made on sales between `from` and `to` (both included),
    /// against today's purchase prices.
    pub async fn realized_profit(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Money> {
        let (start, end) = range_bounds(from, to);
        let items = self.sales.items_between(start, end).await?;
        let products: HashMap<String, Product> = self
            .products
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Ok(report::realized_profit(&items, &products))
    }

    pub async fn realized_profit_today(&self) -> DbResult<Money> {
        let today = Utc::now().date_naive();
        self.realized_profit(today, today).await
    }

    /// Σ (selling − purchase) × stock over the whole catalog.
    pub async fn projected_profit(&self) -> DbResult<Money> {
        let products = self.products.list_all().await?;
        Ok(report::projected_profit(&products))
    }

    /// Σ totals of sales still in `credit`.
    pub async fn outstanding_credit(&self) -> DbResult<Money> {
        let sales = self.sales.list_credit().await?;
        Ok(report::outstanding_credit(&sales))
    }

    pub async fn dashboard_kpis(&self) -> DbResult<DashboardKpis> {
        let today = self.today_summary().await?;
        Ok(DashboardKpis {
            today_revenue: today.revenue,
            today_sale_count: today.sale_count,
            stock_valuation: self.stock_valuation().await?,
            received_purchases: self.received_purchases_total().await?,
        })
    }

    pub async fn finance_kpis(&self) -> DbResult<FinanceKpis> {
        Ok(FinanceKpis {
            projected_profit: self.projected_profit().await?,
            today_realized_profit: self.realized_profit_today().await?,
            outstanding_credit: self.outstanding_credit().await?,
        })
    }

    /// Current year, for callers that default the histogram.
    pub fn current_year() -> i32 {
        Utc::now().year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use ironmonger_core::{
        NewProduct, NewSupplier, PurchaseOrderLineRequest, PurchaseOrderRequest, SaleLineRequest,
        SaleRequest, SaleStatus,
    };

    async fn product(db: &Database, name: &str, purchase: i64, selling: i64, stock: i64) -> Product {
        db.products()
            .create(&NewProduct {
                sku: None,
                name: name.to_string(),
                category: Some("Tools".to_string()),
                unit: None,
                purchase_price: Money::from_cents(purchase),
                selling_price: Money::from_cents(selling),
                promo_price: None,
                opening_stock: Quantity::from_units(stock),
                supplier_id: None,
            })
            .await
            .unwrap()
    }

    fn sale_of(product_id: &str, units: i64, status: SaleStatus) -> SaleRequest {
        SaleRequest {
            client_id: None,
            payment_method: "Cash".to_string(),
            status,
            lines: vec![SaleLineRequest {
                product_id: product_id.to_string(),
                quantity: Quantity::from_units(units),
            }],
        }
    }

    #[tokio::test]
    async fn test_empty_store_reports_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reports = db.reports();

        let kpis = reports.dashboard_kpis().await.unwrap();
        assert_eq!(kpis.today_revenue, Money::zero());
        assert_eq!(kpis.today_sale_count, 0);
        assert_eq!(kpis.stock_valuation, Money::zero());

        let months = reports.monthly_revenue(2026).await.unwrap();
        assert_eq!(months.len(), 12);
        assert!(months.iter().all(|m| m.revenue.is_zero()));
        assert!(reports.low_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_and_finance_kpis() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: "Quincaillerie du Port".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let hammer = product(&db, "Hammer", 6_000, 10_000, 10).await;
        let saw = product(&db, "Saw", 8_000, 12_000, 4).await;
        let ledger = db.ledger();

        ledger.record_sale(&sale_of(&hammer.id, 3, SaleStatus::Paid)).await.unwrap();
        ledger.record_sale(&sale_of(&saw.id, 1, SaleStatus::Credit)).await.unwrap();

        let order = ledger
            .create_purchase_order(&PurchaseOrderRequest {
                supplier_id: supplier.id.clone(),
                lines: vec![PurchaseOrderLineRequest {
                    product_id: saw.id.clone(),
                    quantity: Quantity::from_units(2),
                    unit_cost: Money::from_cents(7_500),
                }],
            })
            .await
            .unwrap();

        let reports = db.reports();
        let kpis = reports.dashboard_kpis().await.unwrap();
        assert_eq!(kpis.today_revenue, Money::from_cents(42_000));
        assert_eq!(kpis.today_sale_count, 2);
        // 7 hammers at 60.00 + 3 saws at 80.00
        assert_eq!(kpis.stock_valuation, Money::from_cents(66_000));
        assert_eq!(kpis.received_purchases, Money::zero());

        ledger.receive_purchase_order(&order.order.id).await.unwrap();
        assert_eq!(
            reports.received_purchases_total().await.unwrap(),
            Money::from_cents(15_000)
        );

        let finance = reports.finance_kpis().await.unwrap();
        // 7 × 40.00 + 5 × 40.00
        assert_eq!(finance.projected_profit, Money::from_cents(48_000));
        // 3 × 40.00 + 1 × 40.00
        assert_eq!(finance.today_realized_profit, Money::from_cents(16_000));
        assert_eq!(finance.outstanding_credit, Money::from_cents(12_000));

        let year = ReportRepository::current_year();
        let month = Utc::now().month0() as usize;
        let months = reports.monthly_revenue(year).await.unwrap();
        assert_eq!(months[month].revenue, Money::from_cents(42_000));
        assert!(reports.monthly_revenue(year - 1).await.unwrap().iter().all(|m| m.revenue.is_zero()));
    }

    #[tokio::test]
    async fn test_realized_profit_skips_deleted_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kept = product(&db, "Chisel", 1_000, 1_500, 10).await;
        let gone = product(&db, "Discontinued file", 1_000, 3_000, 10).await;
        let ledger = db.ledger();

        ledger.record_sale(&sale_of(&kept.id, 2, SaleStatus::Paid)).await.unwrap();
        ledger.record_sale(&sale_of(&gone.id, 2, SaleStatus::Paid)).await.unwrap();
        db.products().delete(&gone.id).await.unwrap();

        let today = Utc::now().date_naive();
        let profit = db.reports().realized_profit(today, today).await.unwrap();
        assert_eq!(profit, Money::from_cents(1_000));

        let summary = db.reports().daily_summary(today).await.unwrap();
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.revenue, Money::from_cents(9_000));
    }

    #[tokio::test]
    async fn test_low_stock_uses_configured_threshold() {
        let db = Database::new(DbConfig::in_memory().low_stock_threshold(Quantity::from_units(5)))
            .await
            .unwrap();
        product(&db, "Sold out", 100, 200, 0).await;
        let low = product(&db, "Nearly gone", 100, 200, 3).await;
        product(&db, "Plenty", 100, 200, 8).await;

        let listed = db.reports().low_stock().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, low.id);

        let wider = db.reports().low_stock_below(Quantity::from_units(10)).await.unwrap();
        assert_eq!(wider.len(), 2);
    }
}
