use anyhow::Result;

use super::schema::Database;
use super::types::SlotInfo;

impl Database {
    // ========================================================================
    // Cache Slot Operations
    // ========================================================================

    /// Read the snapshot stored under `key`, if any.
    pub async fn get_slot(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM cache_slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Replace the snapshot stored under `key` (UPSERT).
    ///
    /// The previous value is overwritten in full; slots are never merged.
    pub async fn set_slot(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_slots (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove the slot stored under `key`.
    ///
    /// Returns whether a slot existed.
    pub async fn clear_slot(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cache_slots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Size and last write time of every stored slot, ordered by key.
    pub async fn slot_info(&self) -> Result<Vec<SlotInfo>> {
        let rows: Vec<(String, i64, String)> = sqlx::query_as(
            "SELECT key, length(CAST(value AS BLOB)), updated_at FROM cache_slots ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, size_bytes, updated_at)| SlotInfo {
                key,
                size_bytes,
                updated_at,
            })
            .collect())
    }
}
