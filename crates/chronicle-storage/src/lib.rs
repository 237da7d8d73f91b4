//! # chronicle-storage
//!
//! SQLite persistence for audit records: one write connection, a read pool,
//! `user_version` migrations, append-only schema enforcement, and atomic
//! per-entity version assignment.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod versioning;

pub use engine::StorageEngine;

use chronicle_core::errors::{ChronicleError, StorageError};

/// Wrap a SQLite failure message into the crate-wide error.
pub fn to_storage_err(message: String) -> ChronicleError {
    ChronicleError::Storage(StorageError::SqliteError { message })
}
