//! Revision reconstruction: fold ordered diffs into a historical state.

pub mod fold;
pub mod materialize;
pub mod reconstruct;

use chrono::{DateTime, Utc};

use chronicle_core::models::{Actor, Attributes, AuditAction, EntityRef};
use chronicle_core::traits::TrackedEntity;

pub use fold::{fold, fold_into};
pub use materialize::materialize;
pub use reconstruct::{reconstruct, reconstruct_at_time, revisions};

/// An entity as it stood after one recorded version.
#[derive(Debug)]
pub struct Revision {
    /// Instance with the folded attributes assigned.
    pub entity: Box<dyn TrackedEntity>,
    /// Folded attribute values, including ones the instance could not hold.
    pub attributes: Attributes,
    /// Version of the last folded record.
    pub version: u64,
    pub action: AuditAction,
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    /// Folded attributes the instance does not support.
    pub skipped_attributes: Vec<String>,
}

impl Revision {
    pub fn entity_ref(&self) -> EntityRef {
        self.entity.entity_ref()
    }

    /// Whether the folded record was a delete.
    pub fn is_deleted(&self) -> bool {
        self.action == AuditAction::Delete
    }
}
