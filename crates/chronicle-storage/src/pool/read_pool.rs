//! Read-only connections to a file-backed store.
//!
//! Readers never contend with the writer under WAL. A call takes the first
//! idle connection starting from a rotating offset and only waits when every
//! connection is busy.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, TryLockError};

use rusqlite::{Connection, OpenFlags};

use chronicle_core::constants::MAX_READ_POOL_SIZE;
use chronicle_core::errors::{ChronicleError, ChronicleResult, StorageError};

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// `size` is clamped to `1..=MAX_READ_POOL_SIZE`.
    pub fn open(path: &Path, size: usize, busy_timeout_ms: u64) -> ChronicleResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connections = (0..size.clamp(1, MAX_READ_POOL_SIZE))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(e.to_string()))?;
                apply_read_pragmas(&conn, busy_timeout_ms)?;
                Ok(Mutex::new(conn))
            })
            .collect::<ChronicleResult<Vec<_>>>()?;
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&Connection) -> ChronicleResult<T>,
    {
        let len = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            match self.connections[(start + offset) % len].try_lock() {
                Ok(conn) => return f(&conn),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(e)) => return Err(poisoned(e)),
            }
        }
        let conn = self.connections[start].lock().map_err(poisoned)?;
        f(&conn)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

fn poisoned(e: impl std::fmt::Display) -> ChronicleError {
    StorageError::LockPoisoned {
        details: format!("read pool: {e}"),
    }
    .into()
}
