//! Per-entity, gap-free version numbers reserved
//! atomically with the record append.

pub mod assigner;

pub use assigner::{append_versioned, append_versioned_async, next_version};
