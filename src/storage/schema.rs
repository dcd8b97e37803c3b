use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

/// Overlapping refreshes of one slot queue on the write lock this long.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 4;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Database
// ============================================================================

/// Durable local storage backing the cache slots.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the cache database at `path` and migrate it.
    ///
    /// `":memory:"` opens a private in-memory database shared by the pool.
    ///
    /// # Errors
    ///
    /// `DatabaseError::InstanceLocked` when another process holds the file,
    /// `DatabaseError::Migration` when the schema cannot be created.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let options = if path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(DatabaseError::from_sqlx)?
        } else {
            let file = Path::new(path);
            restrict_to_owner(file);
            SqliteConnectOptions::new()
                .filename(file)
                .create_if_missing(true)
        };
        let options = options.busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let db = Self { pool };
        db.migrate().await.map_err(DatabaseError::from_migration)?;
        tracing::debug!(path = %path, "Opened cache database");
        Ok(db)
    }

    /// Run schema migrations in a single transaction.
    ///
    /// Every statement is `IF NOT EXISTS`, so re-running on an existing
    /// database is a no-op.
    async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // One row per cache key. `value` is the JSON snapshot, replaced whole.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Snapshots can hold a signed-in user's reading list: create the file with
/// mode 0600 before SQLite opens it, or tighten an existing one.
///
/// Failures are only logged; SQLite reports anything fatal on connect.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let result = if path.exists() {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
    } else {
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(path)
            .map(drop)
    };

    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "Could not restrict cache file to its owner");
    }
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) {}
