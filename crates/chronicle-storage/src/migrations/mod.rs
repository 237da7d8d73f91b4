//! Schema migrations using PRAGMA user_version.

pub mod v001_audit_records;

use rusqlite::Connection;

use chronicle_core::errors::{ChronicleResult, StorageError};

/// Ordered (sql, version) pairs.
const MIGRATIONS: &[(&str, u32)] = &[(v001_audit_records::MIGRATION_SQL, 1)];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> ChronicleResult<()> {
    let current = current_version(conn)?;

    for (sql, version) in MIGRATIONS {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            tracing::info!(version = version, "applied migration");
        }
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> ChronicleResult<u32> {
    let version = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(version)
}

/// Highest schema version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|(_, v)| *v).unwrap_or(0)
}
