//! # chronicle-engine
//!
//! Audit trail orchestration on top of `chronicle-storage`:
//! ambient actor attribution, mutation recording, revision
//! reconstruction, and search.

pub mod context;
pub mod engine;
pub mod observability;
pub mod recorder;
pub mod registry;
pub mod revision;
pub mod search;

pub use context::{current_actor, scope, with_actor};
pub use engine::AuditTrail;
pub use registry::EntityRegistry;
pub use revision::Revision;
pub use search::SearchParams;
