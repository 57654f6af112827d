//! # Inventory Ledger
//!
//! The four operations that move stock or money, each applied as one
//! indivisible unit.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Ledger Operation                                │
//! │                                                                         │
//! │  shape check (no lock)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  writer.lock().await  ─────────────── one ledger operation at a time    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin()                                                           │
//! │       │                                                                 │
//! │       ├── load referenced rows through the transaction                  │
//! │       ├── plan in ironmonger-core (prices, totals, stock checks)        │
//! │       ├── write records + stock movements                               │
//! │       │       (decrement guarded: WHERE stock_milli >= qty)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.commit()  ──── any `?` before this drops `tx` → ROLLBACK            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock released                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed operation leaves no trace: the caller sees the typed error and
//! the store exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ironmonger_core::ledger::{check_sale_request, plan_purchase_order, plan_sale};
use ironmonger_core::validation::validate_payment_method;
use ironmonger_core::{
    CoreError, Product, PurchaseOrder, PurchaseOrderItem, PurchaseOrderRecord,
    PurchaseOrderRequest, PurchaseOrderStatus, Quantity, Sale, SaleItem, SaleRecord,
    SaleRequest, SaleStatus,
};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbResult, LedgerResult};
use crate::repository::product::PRODUCT_COLUMNS;
use crate::repository::purchase_order::{fetch_order, fetch_order_items};
use crate::repository::sale::{fetch_sale, fetch_sale_items};

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a reception request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "order", rename_all = "snake_case")]
pub enum ReceiveOutcome {
    /// Stock was incremented by this call.
    Received(PurchaseOrderRecord),
    /// The order had been received before; nothing changed.
    AlreadyReceived(PurchaseOrderRecord),
}

impl ReceiveOutcome {
    pub fn record(&self) -> &PurchaseOrderRecord {
        match self {
            ReceiveOutcome::Received(record) | ReceiveOutcome::AlreadyReceived(record) => record,
        }
    }

    pub fn into_record(self) -> PurchaseOrderRecord {
        match self {
            ReceiveOutcome::Received(record) | ReceiveOutcome::AlreadyReceived(record) => record,
        }
    }

    /// True when this call applied the stock increase.
    pub fn was_applied(&self) -> bool {
        matches!(self, ReceiveOutcome::Received(_))
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Applies sales, purchase orders, receptions and settlements.
///
/// Obtained from [`Database::ledger`](crate::Database::ledger); all ledgers
/// of one database share the same writer lock.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Ledger {
    pub(crate) fn new(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        Ledger { pool, writer }
    }

    /// Records a sale and takes its quantities out of stock.
    ///
    /// ## Checks, in order
    /// 1. Request shape: at least one line, payment method set
    ///    → `InvalidRequest` / `Validation`
    /// 2. Client exists, when given → `ClientNotFound`
    /// 3. Per line, in request order: quantity > 0 → `InvalidRequest`,
    ///    product exists → `ProductNotFound`, quantity ≤ stock left
    ///    → `InsufficientStock`, line and sale totals in range
    ///    → `InvalidRequest`
    ///
    /// Unit prices are captured here (promo price when positive) and never
    /// change afterwards. The total is the sum of the line totals.
    pub async fn record_sale(&self, request: &SaleRequest) -> LedgerResult<SaleRecord> {
        check_sale_request(request)?;

        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        if let Some(client_id) = &request.client_id {
            if !row_exists(&mut tx, "clients", client_id).await? {
                return Err(CoreError::ClientNotFound(client_id.clone()).into());
            }
        }

        let products =
            load_products(&mut tx, request.lines.iter().map(|l| l.product_id.as_str())).await?;
        let plan = plan_sale(request, &products)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            client_id: request.client_id.clone(),
            payment_method: request.payment_method.trim().to_string(),
            status: request.status,
            total_cents: plan.total.cents(),
            sold_at: Utc::now(),
            settled_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, client_id, payment_method, status, total_cents, sold_at, settled_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.client_id)
        .bind(&sale.payment_method)
        .bind(sale.status)
        .bind(sale.total_cents)
        .bind(sale.sold_at)
        .bind(sale.settled_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for (position, line) in plan.lines.iter().enumerate() {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity_milli: line.quantity.milli(),
                unit_price_cents: line.unit_price.cents(),
                line_total_cents: line.line_total.cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, position, product_id, product_name,
                    quantity_milli, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity_milli)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        let now = Utc::now();
        for (product_id, quantity) in plan.stock_decrements() {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_milli = stock_milli - ?2, updated_at = ?3
                WHERE id = ?1 AND stock_milli >= ?2
                "#,
            )
            .bind(product_id)
            .bind(quantity.milli())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Stock moved after planning; report what is there now.
                let available = current_stock(&mut tx, product_id).await?;
                let name = products
                    .get(product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| product_id.to_string());
                warn!(
                    product_id = %product_id,
                    available = %available,
                    requested = %quantity,
                    "Guarded stock decrement refused"
                );
                return Err(CoreError::InsufficientStock {
                    product: name,
                    available,
                    requested: quantity,
                }
                .into());
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total = %plan.total,
            lines = items.len(),
            status = ?sale.status,
            "Sale recorded"
        );

        Ok(SaleRecord { sale, items })
    }

    /// Records a purchase order in `pending` status.
    ///
    /// Quantities and unit costs are taken as given; stock does not move
    /// until the order is received.
    pub async fn create_purchase_order(
        &self,
        request: &PurchaseOrderRequest,
    ) -> LedgerResult<PurchaseOrderRecord> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let products =
            load_products(&mut tx, request.lines.iter().map(|l| l.product_id.as_str())).await?;
        let plan = plan_purchase_order(request, &products)?;

        if !row_exists(&mut tx, "suppliers", &request.supplier_id).await? {
            return Err(CoreError::SupplierNotFound(request.supplier_id.clone()).into());
        }

        let order = PurchaseOrder {
            id: Uuid::new_v4().to_string(),
            supplier_id: request.supplier_id.clone(),
            status: PurchaseOrderStatus::Pending,
            total_cost_cents: plan.total_cost.cents(),
            ordered_at: Utc::now(),
            received_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (id, supplier_id, status, total_cost_cents, ordered_at, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.supplier_id)
        .bind(order.status)
        .bind(order.total_cost_cents)
        .bind(order.ordered_at)
        .bind(order.received_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for (position, line) in plan.lines.iter().enumerate() {
            let item = PurchaseOrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: line.product_id.clone(),
                quantity_milli: line.quantity.milli(),
                unit_cost_cents: line.unit_cost.cents(),
                line_total_cents: line.line_total.cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO purchase_order_items (
                    id, order_id, position, product_id,
                    quantity_milli, unit_cost_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(item.quantity_milli)
            .bind(item.unit_cost_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            supplier_id = %order.supplier_id,
            total_cost = %plan.total_cost,
            lines = items.len(),
            "Purchase order created"
        );

        Ok(PurchaseOrderRecord { order, items })
    }

    /// Receives a purchase order: every line's quantity goes into stock,
    /// exactly once.
    ///
    /// A second call returns [`ReceiveOutcome::AlreadyReceived`] and
    /// changes nothing. Lines whose product has since been deleted are
    /// skipped.
    pub async fn receive_purchase_order(&self, order_id: &str) -> LedgerResult<ReceiveOutcome> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| CoreError::PurchaseOrderNotFound(order_id.to_string()))?;
        let items = fetch_order_items(&mut *tx, order_id).await?;

        if order.is_received() {
            debug!(order_id = %order_id, "Purchase order already received");
            return Ok(ReceiveOutcome::AlreadyReceived(PurchaseOrderRecord { order, items }));
        }

        let now = Utc::now();
        for item in &items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_milli = stock_milli + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.product_id)
            .bind(item.quantity_milli)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(
                    order_id = %order_id,
                    product_id = %item.product_id,
                    "Skipping reception line for a product no longer in the catalog"
                );
            }
        }

        sqlx::query(
            r#"
            UPDATE purchase_orders SET status = ?2, received_at = ?3
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(order_id)
        .bind(PurchaseOrderStatus::Received)
        .bind(now)
        .bind(PurchaseOrderStatus::Pending)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        order.status = PurchaseOrderStatus::Received;
        order.received_at = Some(now);

        info!(order_id = %order_id, lines = items.len(), "Purchase order received");

        Ok(ReceiveOutcome::Received(PurchaseOrderRecord { order, items }))
    }

    /// Settles a credit sale: status becomes `paid` and the payment label
    /// is replaced by `payment_method`. Amounts are not touched.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - Sale after settlement
    /// * `Ok(Some(record))` - Sale already paid, returned unchanged
    /// * `Ok(None)` - No such sale
    pub async fn settle_credit_sale(
        &self,
        sale_id: &str,
        payment_method: &str,
    ) -> LedgerResult<Option<SaleRecord>> {
        validate_payment_method(payment_method).map_err(CoreError::from)?;

        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let Some(mut sale) = fetch_sale(&mut *tx, sale_id).await? else {
            debug!(sale_id = %sale_id, "Settlement requested for unknown sale");
            return Ok(None);
        };
        let items = fetch_sale_items(&mut *tx, sale_id).await?;

        if !sale.is_credit() {
            debug!(sale_id = %sale_id, "Sale already paid, nothing to settle");
            return Ok(Some(SaleRecord { sale, items }));
        }

        let now = Utc::now();
        let method = payment_method.trim().to_string();

        sqlx::query(
            r#"
            UPDATE sales SET status = ?2, payment_method = ?3, settled_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(sale_id)
        .bind(SaleStatus::Paid)
        .bind(&method)
        .bind(now)
        .bind(SaleStatus::Credit)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        sale.status = SaleStatus::Paid;
        sale.payment_method = method;
        sale.settled_at = Some(now);

        info!(sale_id = %sale_id, total = %sale.total(), "Credit sale settled");

        Ok(Some(SaleRecord { sale, items }))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Loads the distinct products named by `ids`. Unknown ids are absent from
/// the map.
async fn load_products<'a>(
    conn: &mut SqliteConnection,
    ids: impl Iterator<Item = &'a str>,
) -> DbResult<HashMap<String, Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let mut products = HashMap::new();

    for id in ids {
        if products.contains_key(id) {
            continue;
        }
        if let Some(product) = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        {
            products.insert(product.id.clone(), product);
        }
    }

    Ok(products)
}

/// Stock of `product_id` as seen by `conn`; zero for a product that is gone.
async fn current_stock(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Quantity> {
    let milli: Option<i64> = sqlx::query_scalar("SELECT stock_milli FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(Quantity::from_milli(milli.unwrap_or(0)))
}

async fn row_exists(conn: &mut SqliteConnection, table: &'static str, id: &str) -> DbResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DbError, LedgerError};
    use crate::{Database, DbConfig};
    use ironmonger_core::{
        Money, NewClient, NewProduct, NewSupplier, PurchaseOrderLineRequest, SaleLineRequest,
    };

    struct Fixture {
        db: Database,
        supplier_id: String,
    }

    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: "Brico Import".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        Fixture {
            db,
            supplier_id: supplier.id,
        }
    }

    impl Fixture {
        async fn product(&self, name: &str, selling: i64, promo: Option<i64>, stock: i64) -> Product {
            self.db
                .products()
                .create(&NewProduct {
                    sku: None,
                    name: name.to_string(),
                    category: None,
                    unit: None,
                    purchase_price: Money::from_cents(selling / 2),
                    selling_price: Money::from_cents(selling),
                    promo_price: promo.map(Money::from_cents),
                    opening_stock: Quantity::from_units(stock),
                    supplier_id: Some(self.supplier_id.clone()),
                })
                .await
                .unwrap()
        }

        async fn stock(&self, product_id: &str) -> Quantity {
            self.db
                .products()
                .get_by_id(product_id)
                .await
                .unwrap()
                .unwrap()
                .stock()
        }

        fn order(&self, lines: Vec<(&str, i64, i64)>) -> PurchaseOrderRequest {
            PurchaseOrderRequest {
                supplier_id: self.supplier_id.clone(),
                lines: lines
                    .into_iter()
                    .map(|(id, units, cost)| PurchaseOrderLineRequest {
                        product_id: id.to_string(),
                        quantity: Quantity::from_units(units),
                        unit_cost: Money::from_cents(cost),
                    })
                    .collect(),
            }
        }
    }

    fn sale(lines: Vec<(&str, i64)>, status: SaleStatus) -> SaleRequest {
        SaleRequest {
            client_id: None,
            payment_method: if status == SaleStatus::Credit { "Credit" } else { "Cash" }.to_string(),
            status,
            lines: lines
                .into_iter()
                .map(|(id, units)| SaleLineRequest {
                    product_id: id.to_string(),
                    quantity: Quantity::from_units(units),
                })
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // record_sale
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sale_of_three_units() {
        let fx = setup().await;
        let p = fx.product("Claw hammer", 10_000, None, 10).await;

        let record = fx
            .db
            .ledger()
            .record_sale(&sale(vec![(&p.id, 3)], SaleStatus::Paid))
            .await
            .unwrap();

        assert_eq!(record.sale.total(), Money::from_cents(30_000));
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].unit_price(), Money::from_cents(10_000));
        assert_eq!(record.items[0].product_name, "Claw hammer");
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(7));

        let stored = fx.db.sales().get_record(&record.sale.id).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_sale_total_matches_lines() {
        let fx = setup().await;
        let a = fx.product("Wood screws", 1_999, None, 100).await;
        let b = fx.product("Copper wire", 399, Some(350), 100).await;

        let mut request = sale(vec![(&a.id, 2)], SaleStatus::Paid);
        request.lines.push(SaleLineRequest {
            product_id: b.id.clone(),
            quantity: Quantity::from_milli(2_500),
        });

        let record = fx.db.ledger().record_sale(&request).await.unwrap();
        let sum: Money = record
            .items
            .iter()
            .map(|i| i.unit_price().times(i.quantity()))
            .sum();

        assert_eq!(sum, record.sale.total());
        assert_eq!(record.sale.total(), Money::from_cents(3_998 + 875));
        assert_eq!(fx.stock(&b.id).await, Quantity::from_milli(97_500));
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let fx = setup().await;
        let p = fx.product("PVC pipe 40mm", 2_000, None, 5).await;

        let err = fx
            .db
            .ledger()
            .record_sale(&sale(vec![(&p.id, 8)], SaleStatus::Paid))
            .await
            .unwrap_err();

        match err {
            LedgerError::Rejected(CoreError::InsufficientStock {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "PVC pipe 40mm");
                assert_eq!(available, Quantity::from_units(5));
                assert_eq!(requested, Quantity::from_units(8));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(5));
        assert!(fx.db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_line_rolls_back_earlier_lines() {
        let fx = setup().await;
        let a = fx.product("Padlock", 1_200, None, 10).await;
        let b = fx.product("Hinge", 300, None, 1).await;

        let err = fx
            .db
            .ledger()
            .record_sale(&sale(vec![(&a.id, 4), (&b.id, 2)], SaleStatus::Paid))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(fx.stock(&a.id).await, Quantity::from_units(10));
        assert_eq!(fx.stock(&b.id).await, Quantity::from_units(1));
    }

    #[tokio::test]
    async fn test_stock_change_after_planning_reports_current_stock() {
        let fx = setup().await;
        let p = fx.product("Masonry drill", 1_800, None, 10).await;

        // Shrinks stock between planning and the decrement, inside the
        // same transaction.
        sqlx::query(
            r#"
            CREATE TRIGGER shrink_stock AFTER INSERT ON sale_items
            BEGIN
                UPDATE products SET stock_milli = 1000 WHERE id = NEW.product_id;
            END
            "#,
        )
        .execute(fx.db.pool())
        .await
        .unwrap();

        let err = fx
            .db
            .ledger()
            .record_sale(&sale(vec![(&p.id, 3)], SaleStatus::Paid))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_rejection(),
            Some(&CoreError::InsufficientStock {
                product: "Masonry drill".to_string(),
                available: Quantity::from_units(1),
                requested: Quantity::from_units(3),
            })
        );
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(10));
        assert!(fx.db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_order_total_is_rejected() {
        let fx = setup().await;
        let p = fx.product("Scaffold tube", 5_000, None, 0).await;

        let err = fx
            .db
            .ledger()
            .create_purchase_order(&fx.order(vec![(&p.id, 2, i64::MAX / 2 + 10)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InvalidRequest { .. })
        ));
        assert!(fx.db.purchase_orders().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promo_price_is_captured() {
        let fx = setup().await;
        let promo = fx.product("Tape measure", 1_500, Some(1_200), 10).await;
        let no_promo = fx.product("Spirit level", 2_500, Some(0), 10).await;

        let record = fx
            .db
            .ledger()
            .record_sale(&sale(vec![(&promo.id, 1), (&no_promo.id, 1)], SaleStatus::Paid))
            .await
            .unwrap();

        assert_eq!(record.items[0].unit_price_cents, 1_200);
        assert_eq!(record.items[1].unit_price_cents, 2_500);

        // Later price changes do not touch the snapshot.
        fx.db
            .products()
            .update(
                &promo.id,
                &ironmonger_core::ProductPatch {
                    promo_price: Some(Money::from_cents(900)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let items = fx.db.sales().get_items(&record.sale.id).await.unwrap();
        assert_eq!(items[0].unit_price_cents, 1_200);
    }

    #[tokio::test]
    async fn test_sale_rejections() {
        let fx = setup().await;
        let p = fx.product("Drill bit", 500, None, 3).await;
        let ledger = fx.db.ledger();

        let err = ledger
            .record_sale(&sale(vec![("ghost", 1)], SaleStatus::Paid))
            .await
            .unwrap_err();
        assert_eq!(
            err.as_rejection(),
            Some(&CoreError::ProductNotFound("ghost".to_string()))
        );

        let mut request = sale(vec![(&p.id, 1)], SaleStatus::Paid);
        request.client_id = Some("nobody".to_string());
        assert!(ledger.record_sale(&request).await.unwrap_err().is_not_found());

        let err = ledger
            .record_sale(&sale(vec![(&p.id, 0)], SaleStatus::Paid))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InvalidRequest { .. })
        ));

        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(3));
    }

    #[tokio::test]
    async fn test_concurrent_sales_cannot_oversell() {
        let fx = setup().await;
        let p = fx.product("Angle grinder", 45_000, None, 5).await;
        let request = sale(vec![(&p.id, 3)], SaleStatus::Paid);

        let first = fx.db.ledger();
        let second = fx.db.ledger();
        let (a, b) = tokio::join!(first.record_sale(&request), second.record_sale(&request));

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(2));
    }

    // -------------------------------------------------------------------------
    // purchase orders
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_purchase_order_then_reception() {
        let fx = setup().await;
        let p = fx.product("Cement 25kg", 3_000, None, 4).await;
        let ledger = fx.db.ledger();

        let record = ledger
            .create_purchase_order(&fx.order(vec![(&p.id, 20, 50)]))
            .await
            .unwrap();
        assert_eq!(record.order.total_cost(), Money::from_cents(1_000));
        assert_eq!(record.order.status, PurchaseOrderStatus::Pending);
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(4));

        let outcome = ledger.receive_purchase_order(&record.order.id).await.unwrap();
        assert!(outcome.was_applied());
        assert_eq!(outcome.record().order.status, PurchaseOrderStatus::Received);
        assert!(outcome.record().order.received_at.is_some());
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(24));

        let stored = fx
            .db
            .purchase_orders()
            .get_by_id(&record.order.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_received());
    }

    #[tokio::test]
    async fn test_reception_is_idempotent() {
        let fx = setup().await;
        let p = fx.product("Nails 2kg", 800, None, 0).await;
        let ledger = fx.db.ledger();

        let record = ledger
            .create_purchase_order(&fx.order(vec![(&p.id, 20, 400)]))
            .await
            .unwrap();

        let first = ledger.receive_purchase_order(&record.order.id).await.unwrap();
        let second = ledger.receive_purchase_order(&record.order.id).await.unwrap();

        assert!(first.was_applied());
        assert!(!second.was_applied());
        assert_eq!(second.record().order.id, record.order.id);
        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(20));
    }

    #[tokio::test]
    async fn test_reception_skips_deleted_products() {
        let fx = setup().await;
        let kept = fx.product("Trowel", 900, None, 0).await;
        let dropped = fx.product("Old stock", 900, None, 0).await;
        let ledger = fx.db.ledger();

        let record = ledger
            .create_purchase_order(&fx.order(vec![(&kept.id, 5, 450), (&dropped.id, 5, 450)]))
            .await
            .unwrap();
        fx.db.products().delete(&dropped.id).await.unwrap();

        let outcome = ledger.receive_purchase_order(&record.order.id).await.unwrap();
        assert!(outcome.was_applied());
        assert_eq!(outcome.into_record().items.len(), 2);
        assert_eq!(fx.stock(&kept.id).await, Quantity::from_units(5));
    }

    #[tokio::test]
    async fn test_purchase_order_rejections() {
        let fx = setup().await;
        let p = fx.product("Shovel", 2_000, None, 0).await;
        let ledger = fx.db.ledger();

        let mut request = fx.order(vec![(&p.id, 1, 1_000)]);
        request.supplier_id = "nobody".to_string();
        assert_eq!(
            ledger.create_purchase_order(&request).await.unwrap_err().as_rejection(),
            Some(&CoreError::SupplierNotFound("nobody".to_string()))
        );

        let err = ledger
            .create_purchase_order(&fx.order(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InvalidRequest { .. })
        ));

        assert!(ledger
            .receive_purchase_order("missing")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(fx.db.purchase_orders().list_recent(10).await.unwrap().is_empty());
    }

    // -------------------------------------------------------------------------
    // settlement
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_settle_credit_sale_twice() {
        let fx = setup().await;
        let p = fx.product("Wheelbarrow", 60_000, None, 2).await;
        let client = fx
            .db
            .clients()
            .create(&NewClient {
                name: "Rakoto Construction".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut request = sale(vec![(&p.id, 1)], SaleStatus::Credit);
        request.client_id = Some(client.id.clone());
        let record = fx.db.ledger().record_sale(&request).await.unwrap();
        assert!(record.sale.is_credit());

        let settled = fx
            .db
            .ledger()
            .settle_credit_sale(&record.sale.id, "Mobile money")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.sale.status, SaleStatus::Paid);
        assert_eq!(settled.sale.payment_method, "Mobile money");
        assert_eq!(settled.sale.total(), record.sale.total());
        assert!(settled.sale.settled_at.is_some());

        let again = fx
            .db
            .ledger()
            .settle_credit_sale(&record.sale.id, "Cash")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.sale.status, SaleStatus::Paid);
        assert_eq!(again.sale.payment_method, "Mobile money");
        assert_eq!(again.sale.settled_at, settled.sale.settled_at);

        assert_eq!(fx.stock(&p.id).await, Quantity::from_units(1));
        assert_eq!(
            fx.db.sales().list_by_client(&client.id).await.unwrap().len(),
            1
        );
        assert!(matches!(
            fx.db.clients().delete(&client.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_settle_unknown_sale_is_none() {
        let fx = setup().await;
        let result = fx.db.ledger().settle_credit_sale("missing", "Cash").await.unwrap();
        assert!(result.is_none());

        assert!(matches!(
            fx.db.ledger().settle_credit_sale("missing", " ").await,
            Err(LedgerError::Rejected(CoreError::Validation(_)))
        ));
    }

    #[test]
    fn test_receive_outcome_wire_shape() {
        let record = PurchaseOrderRecord {
            order: PurchaseOrder {
                id: "o-1".to_string(),
                supplier_id: "s-1".to_string(),
                status: PurchaseOrderStatus::Received,
                total_cost_cents: 1_000,
                ordered_at: Utc::now(),
                received_at: Some(Utc::now()),
            },
            items: vec![],
        };
        let json = serde_json::to_value(ReceiveOutcome::AlreadyReceived(record)).unwrap();
        assert_eq!(json["outcome"], "already_received");
        assert_eq!(json["order"]["order"]["id"], "o-1");
    }
}
