//! # Sale Repository
//!
//! Read access to recorded sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (Ledger::record_sale, one transaction)                       │
//! │     └── sale row + item snapshots + stock decrements                    │
//! │         status: paid | credit                                           │
//! │                                                                         │
//! │  2. (CREDIT ONLY) SETTLE (Ledger::settle_credit_sale)                   │
//! │     └── status credit → paid, payment label replaced                    │
//! │                                                                         │
//! │  Nothing else ever changes a sale. This repository only reads.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use ironmonger_core::report::range_bounds;
use ironmonger_core::{Sale, SaleItem, SaleRecord};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

pub(crate) const SALE_COLUMNS: &str =
    "id, client_id, payment_method, status, total_cents, sold_at, settled_at";

pub(crate) const SALE_ITEM_COLUMNS: &str = "id, sale_id, product_id, product_name, \
     quantity_milli, unit_price_cents, line_total_cents";

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        fetch_sale(&self.pool, id).await
    }

    /// Sale with its lines, in the order they were recorded.
    pub async fn get_record(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let Some(sale) = fetch_sale(&self.pool, id).await? else {
            return Ok(None);
        };
        let items = fetch_sale_items(&self.pool, id).await?;
        Ok(Some(SaleRecord { sale, items }))
    }

    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        fetch_sale_items(&self.pool, sale_id).await
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales ORDER BY sold_at DESC LIMIT ?1",
            SALE_COLUMNS
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    pub async fn list_by_client(&self, client_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE client_id = ?1 ORDER BY sold_at DESC",
            SALE_COLUMNS
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Sales made between `from` and `to`, both days included.
    pub async fn list_in_range(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Sale>> {
        let (start, end) = range_bounds(from, to);
        self.list_between(start, end).await
    }

    /// Sales with `start <= sold_at < end`, oldest first.
    pub async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        debug!(%start, %end, "Listing sales in range");

        let sql = format!(
            "SELECT {} FROM sales WHERE sold_at >= ?1 AND sold_at < ?2 ORDER BY sold_at",
            SALE_COLUMNS
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Sales still awaiting payment.
    pub async fn list_credit(&self) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE status = 'credit' ORDER BY sold_at",
            SALE_COLUMNS
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Lines of every sale with `start <= sold_at < end`.
    pub async fn items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            r#"SELECT {} FROM sale_items
               WHERE sale_id IN (SELECT id FROM sales WHERE sold_at >= ?1 AND sold_at < ?2)
               ORDER BY sale_id, position"#,
            SALE_ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

pub(crate) async fn fetch_sale<'e, E>(executor: E, id: &str) -> DbResult<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(sale)
}

pub(crate) async fn fetch_sale_items<'e, E>(executor: E, sale_id: &str) -> DbResult<Vec<SaleItem>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY position",
        SALE_ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}
