//! Compile an `AuditFilter` into a parameterised WHERE / ORDER BY / LIMIT tail.

use rusqlite::types::ToSql;

use chronicle_core::models::{Actor, AuditFilter, Predicate, SearchOrder};

use super::{format_lower_bound, format_timestamp};

/// SQL tail (leading space included) plus its positional parameters.
pub struct CompiledFilter {
    pub clause: String,
    pub params: Vec<Box<dyn ToSql>>,
}

pub fn compile(filter: &AuditFilter) -> CompiledFilter {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    for predicate in filter.predicates() {
        match predicate {
            Predicate::EntityType(t) => {
                conditions.push("entity_type = ?".to_string());
                params.push(Box::new(t.clone()));
            }
            Predicate::EntityId(id) => {
                conditions.push("entity_id = ?".to_string());
                params.push(Box::new(id.clone()));
            }
            Predicate::EntityIdIn(ids) if ids.is_empty() => {
                conditions.push("0 = 1".to_string());
            }
            Predicate::EntityIdIn(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                conditions.push(format!("entity_id IN ({placeholders})"));
                for id in ids {
                    params.push(Box::new(id.clone()));
                }
            }
            Predicate::CreatedBetween(begin, end) => {
                conditions.push("created_at >= ? AND created_at <= ?".to_string());
                params.push(Box::new(format_lower_bound(begin)));
                params.push(Box::new(format_timestamp(end)));
            }
            Predicate::CreatedAtOrAfter(at) => {
                conditions.push("created_at >= ?".to_string());
                params.push(Box::new(format_lower_bound(at)));
            }
            Predicate::CreatedAtOrBefore(at) => {
                conditions.push("created_at <= ?".to_string());
                params.push(Box::new(format_timestamp(at)));
            }
            Predicate::VersionAtLeast(v) => {
                conditions.push("version >= ?".to_string());
                params.push(Box::new(clamp_i64(*v)));
            }
            Predicate::VersionAtMost(v) => {
                conditions.push("version <= ?".to_string());
                params.push(Box::new(clamp_i64(*v)));
            }
            Predicate::Actor(Actor::Named { label }) => {
                conditions.push("actor_label = ?".to_string());
                params.push(Box::new(label.clone()));
            }
            Predicate::Actor(Actor::Identified { entity }) => {
                conditions.push("actor_type = ? AND actor_id = ?".to_string());
                params.push(Box::new(entity.entity_type.clone()));
                params.push(Box::new(entity.entity_id.clone()));
            }
            Predicate::Action(action) => {
                conditions.push("action = ?".to_string());
                params.push(Box::new(action.as_str()));
            }
        }
    }

    let mut clause = String::new();
    if !conditions.is_empty() {
        clause.push_str(" WHERE ");
        clause.push_str(&conditions.join(" AND "));
    }

    clause.push_str(match filter.sort_order() {
        SearchOrder::Default if filter.pins_single_entity() => " ORDER BY version ASC",
        SearchOrder::Default => {
            " ORDER BY created_at ASC, entity_type ASC, entity_id ASC, version ASC"
        }
        SearchOrder::Oldest => " ORDER BY created_at ASC, version ASC",
        SearchOrder::Newest => " ORDER BY created_at DESC, version DESC",
    });

    if let Some(limit) = filter.max_results() {
        clause.push_str(" LIMIT ?");
        params.push(Box::new(clamp_i64(limit as u64)));
    }

    CompiledFilter { clause, params }
}

fn clamp_i64(v: u64) -> i64 {
    v.min(i64::MAX as u64) as i64
}
