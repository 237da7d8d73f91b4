//! Shared test helpers for the Chronicle workspace.
//!
//! Provides a schema-driven in-memory entity kind standing in for the host
//! application's models, a manually advanced clock, and small constructors
//! for attribute snapshots.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use serde_json::Value;

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{Attributes, EntityRef};
use chronicle_core::traits::{Clock, EntityKind, TrackedEntity};

/// Build an attribute snapshot from a JSON object literal.
///
/// # Panics
/// Panics if `value` is not a JSON object.
pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => panic!("attribute snapshot must be a JSON object, got {other}"),
    }
}

/// A fixed instant at the given minute of 2026-01-01 (UTC).
pub fn at_minute(minute: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minute)
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// ─── Entity kind ─────────────────────────────────────────────────────────────

/// An entity kind with a fixed attribute schema and an in-memory table of
/// live instances.
#[derive(Debug)]
pub struct InMemoryKind {
    type_name: String,
    schema: Arc<[String]>,
    live: DashMap<String, Attributes>,
}

impl InMemoryKind {
    pub fn new(type_name: &str, schema: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            type_name: type_name.to_string(),
            schema: schema.iter().map(|s| s.to_string()).collect(),
            live: DashMap::new(),
        })
    }

    /// Store (or replace) a live instance. Attributes outside the schema
    /// are dropped.
    pub fn put_live(&self, entity_id: &str, attributes: Attributes) {
        let kept = attributes
            .into_iter()
            .filter(|(name, _)| self.schema.iter().any(|s| s == name))
            .collect();
        self.live.insert(entity_id.to_string(), kept);
    }

    pub fn remove_live(&self, entity_id: &str) {
        self.live.remove(entity_id);
    }

    pub fn entity_ref(&self, entity_id: &str) -> EntityRef {
        EntityRef::new(&self.type_name, entity_id)
    }
}

impl EntityKind for InMemoryKind {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.schema.iter().any(|s| s == name)
    }

    fn instantiate(&self, entity_id: &str) -> Box<dyn TrackedEntity> {
        Box::new(InMemoryEntity {
            entity: self.entity_ref(entity_id),
            schema: Arc::clone(&self.schema),
            values: Attributes::new(),
        })
    }

    fn find_live(&self, entity_id: &str) -> ChronicleResult<Option<Box<dyn TrackedEntity>>> {
        Ok(self.live.get(entity_id).map(|entry| {
            Box::new(InMemoryEntity {
                entity: self.entity_ref(entity_id),
                schema: Arc::clone(&self.schema),
                values: entry.value().clone(),
            }) as Box<dyn TrackedEntity>
        }))
    }

    fn find_ids_containing(&self, attribute: &str, needle: &str) -> ChronicleResult<Vec<String>> {
        let needle = needle.to_lowercase();
        let mut ids: Vec<String> = self
            .live
            .iter()
            .filter(|entry| match entry.value().get(attribute) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                _ => false,
            })
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Instance produced by [`InMemoryKind`].
#[derive(Debug, Clone)]
pub struct InMemoryEntity {
    entity: EntityRef,
    schema: Arc<[String]>,
    values: Attributes,
}

impl TrackedEntity for InMemoryEntity {
    fn entity_ref(&self) -> EntityRef {
        self.entity.clone()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.schema.iter().any(|s| s == name)
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> bool {
        if !self.has_attribute(name) {
            return false;
        }
        self.values.insert(name.to_string(), value);
        true
    }

    fn attributes(&self) -> Attributes {
        self.values.clone()
    }
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    /// Starts at [`at_minute`]`(0)`.
    pub fn at_base() -> Arc<Self> {
        Self::new(base_time())
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unsupported_attribute_is_refused() {
        let kind = InMemoryKind::new("Post", &["title"]);
        let mut post = kind.instantiate("1");
        assert!(post.set_attribute("title", json!("Hello")));
        assert!(!post.set_attribute("body", json!("...")));
        assert_eq!(post.attributes(), attrs(json!({"title": "Hello"})));
    }

    #[test]
    fn containment_lookup_ignores_case() {
        let kind = InMemoryKind::new("Post", &["title"]);
        kind.put_live("1", attrs(json!({"title": "Rust Weekly"})));
        kind.put_live("2", attrs(json!({"title": "Go weekly"})));
        kind.put_live("3", attrs(json!({"title": "Release notes"})));
        assert_eq!(
            kind.find_ids_containing("title", "WEEKLY").unwrap(),
            vec!["1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_base();
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), at_minute(5));
    }
}
