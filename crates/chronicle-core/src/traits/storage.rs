use crate::errors::ChronicleResult;
use crate::models::{AuditFilter, AuditRecord, EntityRef, RecordDraft};

/// Append-only persistence of audit records.
///
/// There is intentionally no update or delete operation.
pub trait IAuditStorage: Send + Sync {
    // --- Write ---
    /// Reserve the next version for the draft's entity and persist the
    /// record in one atomic step.
    fn append(&self, draft: &RecordDraft) -> ChronicleResult<AuditRecord>;

    // --- Versions ---
    fn next_version(&self, entity: &EntityRef) -> ChronicleResult<u64>;
    fn latest_version(&self, entity: &EntityRef) -> ChronicleResult<Option<u64>>;

    // --- Read ---
    fn get(&self, id: &str) -> ChronicleResult<Option<AuditRecord>>;
    /// Records of one entity, ascending by version, optionally capped.
    fn query_by_entity(
        &self,
        entity: &EntityRef,
        max_version: Option<u64>,
    ) -> ChronicleResult<Vec<AuditRecord>>;
    fn query_filtered(&self, filter: &AuditFilter) -> ChronicleResult<Vec<AuditRecord>>;
    fn count(&self) -> ChronicleResult<usize>;
}
