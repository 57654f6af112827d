//! # Purchase Order Repository
//!
//! Read access to purchase orders. Creation and reception are ledger
//! operations ([`Ledger`](crate::ledger::Ledger)).

use chrono::{DateTime, NaiveDate, Utc};
use ironmonger_core::report::range_bounds;
use ironmonger_core::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderRecord};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::DbResult;

pub(crate) const ORDER_COLUMNS: &str =
    "id, supplier_id, status, total_cost_cents, ordered_at, received_at";

pub(crate) const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity_milli, unit_cost_cents, line_total_cents";

#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseOrder>> {
        fetch_order(&self.pool, id).await
    }

    pub async fn get_record(&self, id: &str) -> DbResult<Option<PurchaseOrderRecord>> {
        let Some(order) = fetch_order(&self.pool, id).await? else {
            return Ok(None);
        };
        let items = fetch_order_items(&self.pool, id).await?;
        Ok(Some(PurchaseOrderRecord { order, items }))
    }

    /// Most recent orders first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders ORDER BY ordered_at DESC LIMIT ?1",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, PurchaseOrder>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn list_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE supplier_id = ?1 ORDER BY ordered_at DESC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, PurchaseOrder>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    /// Every received order.
    pub async fn list_received(&self) -> DbResult<Vec<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE status = 'received' ORDER BY received_at",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, PurchaseOrder>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    /// Orders received between `from` and `to`, both days included.
    pub async fn list_received_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<PurchaseOrder>> {
        let (start, end) = range_bounds(from, to);
        self.list_received_between(start, end).await
    }

    pub async fn list_received_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<PurchaseOrder>> {
        let sql = format!(
            r#"SELECT {} FROM purchase_orders
               WHERE status = 'received' AND received_at >= ?1 AND received_at < ?2
               ORDER BY received_at"#,
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, PurchaseOrder>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }
}

pub(crate) async fn fetch_order<'e, E>(executor: E, id: &str) -> DbResult<Option<PurchaseOrder>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM purchase_orders WHERE id = ?1", ORDER_COLUMNS);
    let order = sqlx::query_as::<_, PurchaseOrder>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

pub(crate) async fn fetch_order_items<'e, E>(
    executor: E,
    order_id: &str,
) -> DbResult<Vec<PurchaseOrderItem>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM purchase_order_items WHERE order_id = ?1 ORDER BY position",
        ORDER_ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, PurchaseOrderItem>(&sql)
        .bind(order_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}
