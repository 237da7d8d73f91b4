//! The one connection that appends records.
//!
//! Guarded by a `std::sync::Mutex`: every critical section is a single
//! short SQLite statement or transaction, never held across an `.await`,
//! so the same lock serves blocking callers and async tasks alike.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use chronicle_core::errors::{ChronicleResult, StorageError};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout_ms: u64) -> ChronicleResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::configured(conn, busy_timeout_ms)
    }

    /// Private in-memory database; it is only reachable through this writer.
    pub fn open_in_memory(busy_timeout_ms: u64) -> ChronicleResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::configured(conn, busy_timeout_ms)
    }

    fn configured(conn: Connection, busy_timeout_ms: u64) -> ChronicleResult<Self> {
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` on the connection. Safe to call from inside an async runtime.
    pub fn with_conn<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&Connection) -> ChronicleResult<T>,
    {
        f(&*self.lock()?)
    }

    fn lock(&self) -> ChronicleResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            StorageError::LockPoisoned {
                details: format!("writer: {e}"),
            }
            .into()
        })
    }
}
