pub mod action;
pub mod actor;
pub mod audit_record;
pub mod changes;
pub mod entity_ref;
pub mod filter;
pub mod mutation;

pub use action::AuditAction;
pub use actor::Actor;
pub use audit_record::{AuditRecord, RecordDraft};
pub use changes::{AttributeChange, Attributes, ChangeSet};
pub use entity_ref::EntityRef;
pub use filter::{AuditFilter, Predicate, SearchOrder};
pub use mutation::Mutation;
