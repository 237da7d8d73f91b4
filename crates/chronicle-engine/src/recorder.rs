//! Mutation recorder: turns a hook notification into an appended audit record.

use chrono::{DateTime, SubsecRound, Utc};

use chronicle_core::errors::{ChronicleError, ChronicleResult};
use chronicle_core::models::{Actor, AuditAction, AuditRecord, ChangeSet, Mutation, RecordDraft};
use chronicle_core::traits::IAuditStorage;

/// Build the draft for `mutation`, or `None` when an update changed nothing
/// once `ignored` attributes are dropped.
///
/// The explicit actor on the mutation wins over `ambient`.
pub fn prepare(
    mutation: Mutation,
    ignored: &[String],
    ambient: Option<Actor>,
    now: DateTime<Utc>,
) -> ChronicleResult<Option<RecordDraft>> {
    if mutation.entity.entity_type.trim().is_empty() || mutation.entity.entity_id.trim().is_empty()
    {
        return Err(invalid(format!(
            "entity reference `{}` must have a type and an id",
            mutation.entity
        )));
    }

    let changes = match (mutation.action, &mutation.before, &mutation.after) {
        (AuditAction::Create, _, Some(after)) => ChangeSet::for_create(after),
        (AuditAction::Update, Some(before), Some(after)) => ChangeSet::for_update(before, after),
        (AuditAction::Delete, Some(before), _) => ChangeSet::for_delete(before),
        (action, _, _) => {
            return Err(invalid(format!(
                "{action} of {} is missing a required attribute snapshot",
                mutation.entity
            )))
        }
    }
    .without(ignored);

    if mutation.action == AuditAction::Update && changes.is_empty() {
        tracing::debug!(entity = %mutation.entity, "update changed no audited attribute, nothing recorded");
        return Ok(None);
    }

    Ok(Some(RecordDraft {
        entity: mutation.entity,
        action: mutation.action,
        changes,
        actor: mutation.actor.or(ambient),
        comment: mutation.comment.filter(|c| !c.trim().is_empty()),
        created_at: now.trunc_subsecs(6),
    }))
}

/// Append a prepared draft and log the outcome.
pub fn record(storage: &dyn IAuditStorage, draft: &RecordDraft) -> ChronicleResult<AuditRecord> {
    let record = storage.append(draft)?;
    log_recorded(&record);
    Ok(record)
}

pub(crate) fn log_recorded(record: &AuditRecord) {
    let actor = record
        .actor
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    tracing::info!(
        entity = %record.entity,
        version = record.version,
        action = %record.action,
        actor = %actor,
        "recorded mutation"
    );
}

fn invalid(reason: String) -> ChronicleError {
    ChronicleError::InvalidMutation { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::models::EntityRef;
    use serde_json::json;
    use test_fixtures::{at_minute, attrs};

    fn invoice() -> EntityRef {
        EntityRef::new("Invoice", "1")
    }

    fn ignored() -> Vec<String> {
        vec!["updated_at".to_string()]
    }

    #[test]
    fn create_diff_has_null_old_values() {
        let mutation = Mutation::create(invoice(), attrs(json!({"name": "A", "total": 10})));
        let draft = prepare(mutation, &ignored(), None, at_minute(0))
            .unwrap()
            .unwrap();
        assert_eq!(draft.changes.old_attributes(), attrs(json!({"name": null, "total": null})));
        assert_eq!(draft.changes.new_attributes(), attrs(json!({"name": "A", "total": 10})));
        assert_eq!(draft.created_at, at_minute(0));
    }

    #[test]
    fn timestamp_is_truncated_to_stored_precision() {
        let now = at_minute(0) + chrono::Duration::nanoseconds(7_250);
        let mutation = Mutation::create(invoice(), attrs(json!({"name": "A"})));
        let draft = prepare(mutation, &ignored(), None, now).unwrap().unwrap();
        assert_eq!(draft.created_at, at_minute(0) + chrono::Duration::microseconds(7));
    }

    #[test]
    fn update_touching_only_ignored_attributes_records_nothing() {
        let mutation = Mutation::update(
            invoice(),
            attrs(json!({"name": "A", "updated_at": "t1"})),
            attrs(json!({"name": "A", "updated_at": "t2"})),
        );
        assert!(prepare(mutation, &ignored(), None, at_minute(0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn create_without_attributes_is_still_recorded() {
        let mutation = Mutation::create(invoice(), attrs(json!({})));
        let draft = prepare(mutation, &ignored(), None, at_minute(0)).unwrap();
        assert!(draft.unwrap().changes.is_empty());
    }

    #[test]
    fn explicit_actor_beats_ambient() {
        let mutation = Mutation::delete(invoice(), attrs(json!({"name": "A"}))).by("bob");
        let draft = prepare(mutation, &ignored(), Some(Actor::named("alice")), at_minute(0))
            .unwrap()
            .unwrap();
        assert_eq!(draft.actor, Some(Actor::named("bob")));
    }

    #[test]
    fn ambient_actor_used_when_none_given() {
        let mutation = Mutation::delete(invoice(), attrs(json!({"name": "A"})));
        let draft = prepare(mutation, &ignored(), Some(Actor::named("alice")), at_minute(0))
            .unwrap()
            .unwrap();
        assert_eq!(draft.actor, Some(Actor::named("alice")));
    }

    #[test]
    fn update_missing_snapshot_is_invalid() {
        let mut mutation = Mutation::update(invoice(), attrs(json!({})), attrs(json!({})));
        mutation.before = None;
        let err = prepare(mutation, &ignored(), None, at_minute(0)).unwrap_err();
        assert!(matches!(err, ChronicleError::InvalidMutation { .. }));
    }

    #[test]
    fn blank_entity_id_is_invalid() {
        let mutation = Mutation::create(EntityRef::new("Invoice", " "), attrs(json!({})));
        let err = prepare(mutation, &ignored(), None, at_minute(0)).unwrap_err();
        assert!(matches!(err, ChronicleError::InvalidMutation { .. }));
    }
}
