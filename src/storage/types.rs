use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process has locked the cache database
    #[error("Another instance of briefly appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map a sqlx error, folding SQLite lock conditions into `InstanceLocked`.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if Self::is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }

    /// Map a migration failure. Lock contention during migration still
    /// means another instance owns the file.
    pub(crate) fn from_migration(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if Self::is_lock_message(&message) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Migration(message)
    }

    // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
    pub(crate) fn is_lock_message(message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("database is locked")
            || message.contains("database table is locked")
            || message.contains("sqlite_busy")
            || message.contains("sqlite_locked")
            || message.contains("unable to open database file")
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// Diagnostic view of one persisted slot.
///
/// `updated_at` is informational only; nothing expires on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub key: String,
    pub size_bytes: i64,
    pub updated_at: String,
}
