//! The writer plus, for file-backed stores, a pool of readers.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use chronicle_core::config::StorageConfig;
use chronicle_core::errors::ChronicleResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` in memory: a second connection would open a different database.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, config: &StorageConfig) -> ChronicleResult<Self> {
        Ok(Self {
            writer: WriteConnection::open(path, config.busy_timeout_ms)?,
            readers: Some(ReadPool::open(
                path,
                config.read_pool_size,
                config.busy_timeout_ms,
            )?),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> ChronicleResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory(config.busy_timeout_ms)?,
            readers: None,
            db_path: None,
        })
    }

    /// Run a read on a pooled reader, or on the writer when there is none.
    pub fn read<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> ChronicleResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn(f),
        }
    }

    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
