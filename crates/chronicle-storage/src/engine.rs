//! StorageEngine — owns the ConnectionPool, implements IAuditStorage,
//! runs migrations at startup.
//!
//! Every method may be called from inside a tokio runtime: locks are held
//! only for the duration of one SQLite call.

use std::path::Path;

use chronicle_core::config::{ChronicleConfig, StorageConfig, VersioningConfig};
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditFilter, AuditRecord, EntityRef, RecordDraft};
use chronicle_core::traits::IAuditStorage;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::record_ops;
use crate::versioning;

/// The main storage engine. Owns the connection pool and provides
/// the full IAuditStorage interface.
pub struct StorageEngine {
    pool: ConnectionPool,
    versioning: VersioningConfig,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk, with default settings.
    pub fn open(path: &Path) -> ChronicleResult<Self> {
        Self::open_file(path, &StorageConfig::default(), VersioningConfig::default())
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> ChronicleResult<Self> {
        Self::open_memory(&StorageConfig::default(), VersioningConfig::default())
    }

    /// Open according to `config.storage.path`; in memory when unset.
    pub fn open_with_config(config: &ChronicleConfig) -> ChronicleResult<Self> {
        match &config.storage.path {
            Some(path) => Self::open_file(path, &config.storage, config.versioning.clone()),
            None => Self::open_memory(&config.storage, config.versioning.clone()),
        }
    }

    fn open_file(
        path: &Path,
        storage: &StorageConfig,
        versioning: VersioningConfig,
    ) -> ChronicleResult<Self> {
        // The schema must exist before read-only connections attach.
        {
            let conn = rusqlite::Connection::open(path)
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            crate::pool::pragmas::apply_pragmas(&conn, storage.busy_timeout_ms)?;
            migrations::run_migrations(&conn)?;
        }
        let pool = ConnectionPool::open(path, storage)?;
        tracing::debug!(path = %path.display(), readers = pool.reader_count(), "opened audit store");
        Ok(Self { pool, versioning })
    }

    fn open_memory(storage: &StorageConfig, versioning: VersioningConfig) -> ChronicleResult<Self> {
        let pool = ConnectionPool::open_in_memory(storage)?;
        pool.writer.with_conn(migrations::run_migrations)?;
        tracing::debug!("opened in-memory audit store");
        Ok(Self { pool, versioning })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Database file, `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.pool.db_path.as_deref()
    }

    pub fn versioning_config(&self) -> &VersioningConfig {
        &self.versioning
    }

    /// Append from async code. Same guarantees as [`IAuditStorage::append`];
    /// contention backoff sleeps on the runtime timer instead of the thread.
    pub async fn append_async(&self, draft: &RecordDraft) -> ChronicleResult<AuditRecord> {
        versioning::append_versioned_async(&self.pool.writer, draft, &self.versioning).await
    }

    fn with_reader<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> ChronicleResult<T>,
    {
        self.pool.read(f)
    }
}

impl IAuditStorage for StorageEngine {
    fn append(&self, draft: &RecordDraft) -> ChronicleResult<AuditRecord> {
        self.pool
            .writer
            .with_conn(|conn| versioning::append_versioned(conn, draft, &self.versioning))
    }

    fn next_version(&self, entity: &EntityRef) -> ChronicleResult<u64> {
        self.with_reader(|conn| versioning::next_version(conn, entity))
    }

    fn latest_version(&self, entity: &EntityRef) -> ChronicleResult<Option<u64>> {
        self.with_reader(|conn| record_ops::latest_version(conn, entity))
    }

    fn get(&self, id: &str) -> ChronicleResult<Option<AuditRecord>> {
        self.with_reader(|conn| record_ops::get_record(conn, id))
    }

    fn query_by_entity(
        &self,
        entity: &EntityRef,
        max_version: Option<u64>,
    ) -> ChronicleResult<Vec<AuditRecord>> {
        self.with_reader(|conn| record_ops::query_by_entity(conn, entity, max_version))
    }

    fn query_filtered(&self, filter: &AuditFilter) -> ChronicleResult<Vec<AuditRecord>> {
        self.with_reader(|conn| record_ops::query_filtered(conn, filter))
    }

    fn count(&self) -> ChronicleResult<usize> {
        self.with_reader(record_ops::count_records)
    }
}
