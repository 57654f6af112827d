//! # Client Repository

use chrono::Utc;
use ironmonger_core::validation::{validate_name, validate_new_client};
use ironmonger_core::{Client, ClientPatch, NewClient};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const CLIENT_COLUMNS: &str =
    "id, name, kind, phone, email, address, tax_id, stat_number, created_at";

#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    pub async fn create(&self, input: &NewClient) -> DbResult<Client> {
        validate_new_client(input)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            kind: input.kind,
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            tax_id: input.tax_id.clone(),
            stat_number: input.stat_number.clone(),
            created_at: Utc::now(),
        };

        debug!(name = %client.name, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, kind, phone, email, address, tax_id, stat_number, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(client.kind)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.tax_id)
        .bind(&client.stat_number)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let sql = format!("SELECT {} FROM clients ORDER BY name", CLIENT_COLUMNS);
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    pub async fn update(&self, id: &str, patch: &ClientPatch) -> DbResult<Client> {
        if let Some(name) = &patch.name {
            validate_name("name", name)?;
        }

        let mut client = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))?;
        patch.apply(&mut client);

        debug!(id = %id, "Updating client");

        sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2, kind = ?3, phone = ?4, email = ?5,
                address = ?6, tax_id = ?7, stat_number = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(client.kind)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.tax_id)
        .bind(&client.stat_number)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    /// Deletes a client. Refused while any sale references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }
        Ok(())
    }
}
