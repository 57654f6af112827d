//! # Product Repository
//!
//! Catalog operations on products.
//!
//! Stock is written here exactly once, as the opening stock of a new
//! product. Every later stock movement goes through the
//! [`Ledger`](crate::ledger::Ledger).
//!
//! ## SKU Derivation
//! ```text
//! "Claw hammer 500g"  ──► prefix "CLA" ──► CLA-0001, CLA-0002, ...
//! "3m tape"           ──► prefix "3MT" ──► 3MT-0001
//! "Ax"                ──► prefix "AXX" ──► AXX-0001
//! ```

use chrono::Utc;
use ironmonger_core::validation::{derive_sku, validate_name, validate_new_product, validate_price};
use ironmonger_core::{NewProduct, Product, ProductPatch};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub(crate) const PRODUCT_COLUMNS: &str = "id, sku, name, category, unit, \
     purchase_price_cents, selling_price_cents, promo_price_cents, \
     stock_milli, supplier_id, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product with its opening stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::Validation)` - Bad name, SKU, price or stock
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown supplier
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        let sku = match &input.sku {
            Some(sku) => sku.trim().to_string(),
            None => self.next_sku(&input.name).await?,
        };
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            sku,
            name: input.name.trim().to_string(),
            category: input.category.clone(),
            unit: input.unit.clone(),
            purchase_price_cents: input.purchase_price.cents(),
            selling_price_cents: input.selling_price.cents(),
            promo_price_cents: input.promo_price.map(|p| p.cents()),
            stock_milli: input.opening_stock.milli(),
            supplier_id: input.supplier_id.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, category, unit,
                purchase_price_cents, selling_price_cents, promo_price_cents,
                stock_milli, supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.promo_price_cents)
        .bind(product.stock_milli)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.sku.clone(),
            },
            other => other,
        })?;

        Ok(product)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE sku = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY name, sku LIMIT ?1 OFFSET ?2",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Every product, ordered by name. Used by the report folds.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY name, sku", PRODUCT_COLUMNS);
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn list_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE supplier_id = ?1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Products that can be sold right now (stock > 0).
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE stock_milli > 0 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Case-insensitive substring search on name and SKU.
    ///
    /// An empty query lists the first `limit` products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit, 0).await;
        }

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"SELECT {} FROM products
               WHERE name LIKE ?1 ESCAPE '\' OR sku LIKE ?1 ESCAPE '\'
               ORDER BY name
               LIMIT ?2"#,
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Applies a patch: only the `Some` fields are written.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        if let Some(name) = &patch.name {
            validate_name("name", name)?;
        }
        for (field, price) in [
            ("purchase_price", patch.purchase_price),
            ("selling_price", patch.selling_price),
            ("promo_price", patch.promo_price),
        ] {
            if let Some(price) = price {
                validate_price(field, price)?;
            }
        }

        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if patch.is_empty() {
            return Ok(product);
        }

        debug!(id = %id, "Updating product");

        patch.apply(&mut product);
        product.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                unit = ?4,
                purchase_price_cents = ?5,
                selling_price_cents = ?6,
                promo_price_cents = ?7,
                supplier_id = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.promo_price_cents)
        .bind(&product.supplier_id)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Removes a product from the catalog.
    ///
    /// Past sale and order lines keep their snapshot; reports skip them
    /// where a current purchase price is needed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Next free SKU for a product called `name`.
    pub async fn next_sku(&self, name: &str) -> DbResult<String> {
        let prefix = derive_sku(name, 0);
        let prefix = prefix.trim_end_matches(char::is_numeric);

        let used: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE sku LIKE ?1")
            .bind(format!("{}%", prefix))
            .fetch_one(&self.pool)
            .await?;

        let mut sequence = u32::try_from(used).unwrap_or(u32::MAX - 1).saturating_add(1);
        loop {
            let candidate = derive_sku(name, sequence);
            if self.get_by_sku(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            sequence = sequence.saturating_add(1);
        }
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
