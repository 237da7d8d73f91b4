//! Read queries over `audit_records` and row decoding.

use rusqlite::{params, Connection, OptionalExtension, Row};

use chronicle_core::errors::{ChronicleResult, StorageError};
use chronicle_core::models::{Actor, AuditAction, AuditFilter, AuditRecord, ChangeSet, EntityRef};

use super::{filter_sql, parse_timestamp};
use crate::to_storage_err;

/// The base SELECT columns for all record queries (indices 0-10).
pub const RECORD_COLUMNS: &str = "id, entity_type, entity_id, action, changes, version, \
     actor_label, actor_type, actor_id, comment, created_at";

/// Split an actor into its `(label, type, id)` columns.
pub fn actor_columns(actor: Option<&Actor>) -> (Option<&str>, Option<&str>, Option<&str>) {
    match actor {
        Some(Actor::Named { label }) => (Some(label.as_str()), None, None),
        Some(Actor::Identified { entity }) => (
            None,
            Some(entity.entity_type.as_str()),
            Some(entity.entity_id.as_str()),
        ),
        None => (None, None, None),
    }
}

fn actor_from_columns(
    label: Option<String>,
    actor_type: Option<String>,
    actor_id: Option<String>,
) -> Option<Actor> {
    match (label, actor_type, actor_id) {
        (Some(label), _, _) => Some(Actor::named(label)),
        (None, Some(t), Some(id)) => Some(Actor::identified(EntityRef::new(t, id))),
        _ => None,
    }
}

/// Decode one row selected with [`RECORD_COLUMNS`].
pub fn parse_record_row(row: &Row<'_>) -> ChronicleResult<AuditRecord> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let id: String = row.get(0).map_err(get_err)?;
    let action_text: String = row.get(3).map_err(get_err)?;
    let changes_text: String = row.get(4).map_err(get_err)?;
    let version: i64 = row.get(5).map_err(get_err)?;
    let created_text: String = row.get(10).map_err(get_err)?;

    let action = action_text
        .parse::<AuditAction>()
        .map_err(|details| StorageError::CorruptionDetected { details })?;
    let changes = ChangeSet::decode(&id, &changes_text)?;

    Ok(AuditRecord {
        entity: EntityRef::new(
            row.get::<_, String>(1).map_err(get_err)?,
            row.get::<_, String>(2).map_err(get_err)?,
        ),
        action,
        changes,
        version: version as u64,
        actor: actor_from_columns(
            row.get(6).map_err(get_err)?,
            row.get(7).map_err(get_err)?,
            row.get(8).map_err(get_err)?,
        ),
        comment: row.get(9).map_err(get_err)?,
        created_at: parse_timestamp(&created_text)?,
        id,
    })
}

fn collect_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> ChronicleResult<Vec<AuditRecord>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| Ok(parse_record_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let record = row.map_err(|e| to_storage_err(e.to_string()))??;
        results.push(record);
    }
    Ok(results)
}

/// Get a single record by id.
pub fn get_record(conn: &Connection, id: &str) -> ChronicleResult<Option<AuditRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM audit_records WHERE id = ?1");
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let record = stmt
        .query_row(params![id], |row| Ok(parse_record_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    record.transpose()
}

/// All records of an entity with `version <= max_version`, ascending.
pub fn query_by_entity(
    conn: &Connection,
    entity: &EntityRef,
    max_version: Option<u64>,
) -> ChronicleResult<Vec<AuditRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM audit_records \
         WHERE entity_type = ?1 AND entity_id = ?2 AND version <= ?3 \
         ORDER BY version ASC"
    );
    let cap = max_version.map(|v| v.min(i64::MAX as u64) as i64).unwrap_or(i64::MAX);
    collect_records(
        conn,
        &sql,
        params![entity.entity_type, entity.entity_id, cap],
    )
}

/// Records matching a filter, in the filter's order.
pub fn query_filtered(conn: &Connection, filter: &AuditFilter) -> ChronicleResult<Vec<AuditRecord>> {
    let compiled = filter_sql::compile(filter);
    let sql = format!("SELECT {RECORD_COLUMNS} FROM audit_records{}", compiled.clause);
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        compiled.params.iter().map(|p| p.as_ref()).collect();
    tracing::debug!(sql = %sql, params = params_refs.len(), "filtered audit query");
    collect_records(conn, &sql, params_refs.as_slice())
}

/// Highest version recorded for an entity.
pub fn latest_version(conn: &Connection, entity: &EntityRef) -> ChronicleResult<Option<u64>> {
    let max: Option<i64> = conn
        .query_row(
            "SELECT MAX(version) FROM audit_records WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity.entity_type, entity.entity_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(max.map(|v| v as u64))
}

/// Total number of records.
pub fn count_records(conn: &Connection) -> ChronicleResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM audit_records", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}
