//! # Supplier Repository

use chrono::Utc;
use ironmonger_core::validation::{validate_name, validate_new_supplier};
use ironmonger_core::{NewSupplier, Supplier, SupplierPatch};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SUPPLIER_COLUMNS: &str = "id, name, contact_person, phone, email, address, created_at";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn create(&self, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;

        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            created_at: Utc::now(),
        };

        debug!(name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_person, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers WHERE id = ?1", SUPPLIER_COLUMNS);
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    /// All suppliers, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers ORDER BY name", SUPPLIER_COLUMNS);
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn update(&self, id: &str, patch: &SupplierPatch) -> DbResult<Supplier> {
        if let Some(name) = &patch.name {
            validate_name("name", name)?;
        }

        let mut supplier = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))?;
        patch.apply(&mut supplier);

        debug!(id = %id, "Updating supplier");

        sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2, contact_person = ?3, phone = ?4, email = ?5, address = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Deletes a supplier.
    ///
    /// Refused with `ForeignKeyViolation` while products or purchase orders
    /// still reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }
        Ok(())
    }
}
