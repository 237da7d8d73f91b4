//! Atomic read-max-and-reserve.
//!
//! One IMMEDIATE transaction runs a single `INSERT … SELECT MAX(version) + 1`
//! scoped to the entity key. The unique `(entity_type, entity_id, version)`
//! index turns any lost race into a constraint violation instead of a
//! duplicate; busy databases and such violations are retried with a
//! bounded, linear backoff before surfacing `VersioningConflict`.

use std::time::Duration;

use chrono::SubsecRound;
use rusqlite::{params, Connection, ErrorCode, Transaction, TransactionBehavior};
use uuid::Uuid;

use chronicle_core::config::VersioningConfig;
use chronicle_core::constants::FIRST_VERSION;
use chronicle_core::errors::{ChronicleError, ChronicleResult};
use chronicle_core::models::{AuditRecord, EntityRef, RecordDraft};

use crate::pool::WriteConnection;
use crate::queries::format_timestamp;
use crate::queries::record_ops::actor_columns;
use crate::to_storage_err;

const INSERT_NEXT_VERSION: &str = "
    INSERT INTO audit_records
        (id, entity_type, entity_id, action, changes, version,
         actor_label, actor_type, actor_id, comment, created_at)
    SELECT ?1, ?2, ?3, ?4, ?5, COALESCE(MAX(version) + 1, ?11), ?6, ?7, ?8, ?9, ?10
    FROM audit_records
    WHERE entity_type = ?2 AND entity_id = ?3
    RETURNING version";

/// `1 + max(version)` for the entity, [`FIRST_VERSION`] when it has no
/// records yet.
pub fn next_version(conn: &Connection, entity: &EntityRef) -> ChronicleResult<u64> {
    let next: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version) + 1, ?3) FROM audit_records \
             WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity.entity_type, entity.entity_id, FIRST_VERSION as i64],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(next as u64)
}

/// Draft fields encoded once, reused across attempts.
struct PreparedDraft<'a> {
    draft: &'a RecordDraft,
    id: String,
    changes: String,
    created_at: String,
}

impl<'a> PreparedDraft<'a> {
    fn new(draft: &'a RecordDraft) -> ChronicleResult<Self> {
        Ok(Self {
            draft,
            id: Uuid::new_v4().to_string(),
            changes: draft.changes.encode()?,
            created_at: format_timestamp(&draft.created_at),
        })
    }

    fn into_record(self, version: u64) -> AuditRecord {
        let mut record = self.draft.clone().into_record(self.id, version);
        // Stored precision is microseconds.
        record.created_at = record.created_at.trunc_subsecs(6);
        record
    }
}

fn try_append(conn: &Connection, prepared: &PreparedDraft<'_>) -> Result<u64, rusqlite::Error> {
    let draft = prepared.draft;
    let (label, actor_type, actor_id) = actor_columns(draft.actor.as_ref());

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let version: i64 = tx.query_row(
        INSERT_NEXT_VERSION,
        params![
            prepared.id,
            draft.entity.entity_type,
            draft.entity.entity_id,
            draft.action.as_str(),
            prepared.changes,
            label,
            actor_type,
            actor_id,
            draft.comment,
            prepared.created_at,
            FIRST_VERSION as i64,
        ],
        |row| row.get(0),
    )?;
    tx.commit()?;
    Ok(version as u64)
}

/// Errors another writer can cause and a later attempt can clear.
fn is_contention(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => true,
            ErrorCode::ConstraintViolation => {
                e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        },
        _ => false,
    }
}

enum Step {
    Done(u64),
    Retry(Duration),
}

fn classify(
    outcome: Result<u64, rusqlite::Error>,
    entity: &EntityRef,
    attempt: u32,
    config: &VersioningConfig,
) -> ChronicleResult<Step> {
    match outcome {
        Ok(version) => Ok(Step::Done(version)),
        Err(e) if is_contention(&e) => {
            if attempt >= config.max_attempts {
                tracing::warn!(entity = %entity, attempts = attempt, "version reservation exhausted");
                return Err(ChronicleError::VersioningConflict {
                    entity: entity.to_string(),
                    attempts: attempt,
                });
            }
            tracing::warn!(entity = %entity, attempt, error = %e, "version reservation contended, retrying");
            Ok(Step::Retry(Duration::from_millis(
                config.retry_backoff_ms.saturating_mul(attempt as u64),
            )))
        }
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

/// Reserve the next version and append the record, retrying on contention.
pub fn append_versioned(
    conn: &Connection,
    draft: &RecordDraft,
    config: &VersioningConfig,
) -> ChronicleResult<AuditRecord> {
    let prepared = PreparedDraft::new(draft)?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match classify(try_append(conn, &prepared), &draft.entity, attempt, config)? {
            Step::Done(version) => return Ok(prepared.into_record(version)),
            Step::Retry(backoff) => std::thread::sleep(backoff),
        }
    }
}

/// Async variant. The write lock is released between attempts and the
/// backoff yields to the runtime.
pub async fn append_versioned_async(
    writer: &WriteConnection,
    draft: &RecordDraft,
    config: &VersioningConfig,
) -> ChronicleResult<AuditRecord> {
    let prepared = PreparedDraft::new(draft)?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = writer.with_conn(|conn| Ok(try_append(conn, &prepared)))?;
        match classify(outcome, &draft.entity, attempt, config)? {
            Step::Done(version) => return Ok(prepared.into_record(version)),
            Step::Retry(backoff) => tokio::time::sleep(backoff).await,
        }
    }
}
