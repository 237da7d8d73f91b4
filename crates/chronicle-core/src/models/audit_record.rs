use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Actor, Attributes, AuditAction, ChangeSet, EntityRef};

/// An entry in the append-only audit log. Never mutated once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub entity: EntityRef,
    pub action: AuditAction,
    pub changes: ChangeSet,
    /// Dense per-entity sequence starting at 1. Authoritative for replay order.
    pub version: u64,
    pub actor: Option<Actor>,
    pub comment: Option<String>,
    /// Microsecond precision. Used for range queries only, never for
    /// ordering replay.
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new_attributes(&self) -> Attributes {
        self.changes.new_attributes()
    }

    pub fn old_attributes(&self) -> Attributes {
        self.changes.old_attributes()
    }
}

/// A record that has not been assigned an id or a version yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub entity: EntityRef,
    pub action: AuditAction,
    pub changes: ChangeSet,
    pub actor: Option<Actor>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecordDraft {
    /// Complete the draft with the id and version reserved by the store.
    pub fn into_record(self, id: String, version: u64) -> AuditRecord {
        AuditRecord {
            id,
            entity: self.entity,
            action: self.action,
            changes: self.changes,
            version,
            actor: self.actor,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}
