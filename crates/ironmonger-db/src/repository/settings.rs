//! # Settings Repository
//!
//! Company details printed on invoices and receipts, stored as key/value
//! pairs.

use std::collections::BTreeMap;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Keys known to the store, with the value written when a key is missing
/// or blank.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("company_name", "Ironmonger Hardware"),
    ("company_address", "Main Street"),
    ("company_phone", "+000 00 000 00"),
    ("company_email", "contact@ironmonger.local"),
    ("company_tax_id", "0000000000"),
    ("company_stat_number", "00000 00 0000 0 00000"),
    ("company_bank_account", "-"),
    ("currency_label", "Ar"),
    ("vat_rate_bps", "2000"),
];

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// All settings, ordered by key. A NULL value reads as empty.
    pub async fn get_all(&self) -> DbResult<BTreeMap<String, String>> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or_default()))
            .collect())
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<Option<String>> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.map(Option::unwrap_or_default))
    }

    /// Inserts or overwrites every given pair in one transaction, then
    /// returns the full map.
    pub async fn set_many<I, K, V>(&self, values: I) -> DbResult<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tx = self.pool.begin().await?;
        let mut written = 0usize;

        for (key, value) in values {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key.into())
            .bind(value.into())
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;
        debug!(written, "Settings updated");

        self.get_all().await
    }

    /// Writes the default value of every known key that is missing or
    /// blank. Returns how many keys were filled.
    pub async fn seed_defaults(&self) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut filled = 0u64;

        for (key, value) in DEFAULT_SETTINGS {
            let result = sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                WHERE settings.value IS NULL OR TRIM(settings.value) = ''
                "#,
            )
            .bind(*key)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
            filled += result.rows_affected();
        }

        tx.commit().await?;
        if filled > 0 {
            info!(filled, "Default settings written");
        }
        Ok(filled)
    }
}
