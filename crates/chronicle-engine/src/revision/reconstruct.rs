//! Reconstruction algorithm: registry lookup, load, fold, materialize.
//!
//! 1. Resolve the entity kind (unknown type is an error).
//! 2. Load the entity's records up to the target, ascending by version.
//! 3. Fold their new-value projections.
//! 4. Assign the folded attributes onto the live instance if one exists,
//!    else onto a fresh default instance.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{Attributes, AuditFilter, AuditRecord, EntityRef, SearchOrder};
use chronicle_core::traits::{EntityKind, IAuditStorage, TrackedEntity};

use super::{fold, fold_into, materialize, Revision};
use crate::registry::EntityRegistry;

/// State of an entity as of `target_version`.
///
/// `None` when the entity has no record at or below the target.
pub fn reconstruct(
    storage: &dyn IAuditStorage,
    registry: &EntityRegistry,
    entity_type: &str,
    entity_id: &str,
    target_version: u64,
) -> ChronicleResult<Option<Revision>> {
    let kind = registry.resolve(entity_type)?;
    let entity = EntityRef::new(entity_type, entity_id);
    let records = storage.query_by_entity(&entity, Some(target_version))?;

    let Some(last) = records.last() else {
        return Ok(None);
    };
    let attributes = fold(&records);
    tracing::debug!(
        entity = %entity,
        target_version,
        folded = records.len(),
        "reconstructed revision"
    );
    revision_from(&kind, entity_id, attributes, last).map(Some)
}

/// State of an entity as of the newest record created at or before `as_of`.
pub fn reconstruct_at_time(
    storage: &dyn IAuditStorage,
    registry: &EntityRegistry,
    entity_type: &str,
    entity_id: &str,
    as_of: DateTime<Utc>,
) -> ChronicleResult<Option<Revision>> {
    registry.resolve(entity_type)?;
    let filter = AuditFilter::new()
        .entity_type(entity_type)
        .entity_id(entity_id)
        .older_than(Some(as_of))
        .order(SearchOrder::Newest)
        .limit(Some(1));
    if !filter.pins_single_entity() {
        return Ok(None);
    }

    match storage.query_filtered(&filter)?.first() {
        Some(newest) => reconstruct(storage, registry, entity_type, entity_id, newest.version),
        None => Ok(None),
    }
}

/// Every revision of an entity, ascending by version, in one pass.
pub fn revisions(
    storage: &dyn IAuditStorage,
    registry: &EntityRegistry,
    entity_type: &str,
    entity_id: &str,
) -> ChronicleResult<Vec<Revision>> {
    let kind = registry.resolve(entity_type)?;
    let records = storage.query_by_entity(&EntityRef::new(entity_type, entity_id), None)?;

    let mut state = Attributes::new();
    let mut result = Vec::with_capacity(records.len());
    for record in &records {
        fold_into(&mut state, record);
        result.push(revision_from(&kind, entity_id, state.clone(), record)?);
    }
    Ok(result)
}

fn revision_from(
    kind: &Arc<dyn EntityKind>,
    entity_id: &str,
    attributes: Attributes,
    last: &AuditRecord,
) -> ChronicleResult<Revision> {
    let mut entity = base_instance(kind.as_ref(), entity_id)?;
    let skipped_attributes = materialize(entity.as_mut(), &attributes);
    Ok(Revision {
        entity,
        attributes,
        version: last.version,
        action: last.action,
        actor: last.actor.clone(),
        created_at: last.created_at,
        skipped_attributes,
    })
}

fn base_instance(kind: &dyn EntityKind, entity_id: &str) -> ChronicleResult<Box<dyn TrackedEntity>> {
    Ok(match kind.find_live(entity_id)? {
        Some(live) => live,
        None => kind.instantiate(entity_id),
    })
}
