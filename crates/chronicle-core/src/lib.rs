//! # chronicle-core
//!
//! Foundation crate for the Chronicle audit trail.
//! Defines the record model, the diff codec, the query filter, traits,
//! errors, config, and constants. Every other crate in the workspace
//! depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ChronicleConfig;
pub use errors::{ChronicleError, ChronicleResult};
pub use models::{
    Actor, Attributes, AuditAction, AuditFilter, AuditRecord, ChangeSet, EntityRef, Mutation,
    RecordDraft,
};
