//! Blank-tolerant, conjunctive query builder for audit records.
//!
//! Every builder method accepts blank or absent input and treats it as
//! "no constraint". Predicates are independent of each other and of the
//! order they were added in.
//!
//! # Examples
//!
//! ```
//! use chronicle_core::models::AuditFilter;
//!
//! let filter = AuditFilter::new().entity_type("Invoice").entity_id("  ");
//! assert_eq!(filter.predicates().len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Actor, AuditAction, AuditRecord};

/// One conjunct of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    EntityType(String),
    EntityId(String),
    /// Entity id is one of the listed ids. An empty list matches nothing.
    EntityIdIn(Vec<String>),
    /// Inclusive on both ends.
    CreatedBetween(DateTime<Utc>, DateTime<Utc>),
    CreatedAtOrAfter(DateTime<Utc>),
    CreatedAtOrBefore(DateTime<Utc>),
    VersionAtLeast(u64),
    VersionAtMost(u64),
    Actor(Actor),
    Action(AuditAction),
}

impl Predicate {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        match self {
            Self::EntityType(t) => record.entity.entity_type == *t,
            Self::EntityId(id) => record.entity.entity_id == *id,
            Self::EntityIdIn(ids) => ids.contains(&record.entity.entity_id),
            Self::CreatedBetween(begin, end) => {
                record.created_at >= *begin && record.created_at <= *end
            }
            Self::CreatedAtOrAfter(at) => record.created_at >= *at,
            Self::CreatedAtOrBefore(at) => record.created_at <= *at,
            Self::VersionAtLeast(v) => record.version >= *v,
            Self::VersionAtMost(v) => record.version <= *v,
            Self::Actor(actor) => record.actor.as_ref() == Some(actor),
            Self::Action(action) => record.action == *action,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    /// Version ascending when a single entity is pinned, otherwise
    /// creation time ascending (ties broken by version).
    #[default]
    Default,
    Oldest,
    Newest,
}

/// Conjunction of optional predicates plus ordering and limit.
///
/// Record timestamps are kept at microsecond precision. Date bounds may be
/// finer; they compare exactly against the stored microsecond value, so a
/// record stamped `t` matches `newer_than(t)` and `older_than(t)` and no
/// record outside `[begin, end]` ever matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    predicates: Vec<Predicate>,
    order: SearchOrder,
    limit: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by exact entity type.
    pub fn entity_type(self, entity_type: &str) -> Self {
        match non_blank(entity_type) {
            Some(t) => self.with(Predicate::EntityType(t.to_string())),
            None => self,
        }
    }

    /// Filter by exact entity id.
    pub fn entity_id(self, entity_id: &str) -> Self {
        match non_blank(entity_id) {
            Some(id) => self.with(Predicate::EntityId(id.to_string())),
            None => self,
        }
    }

    /// Restrict to a resolved set of entity ids.
    pub fn entity_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Predicate::EntityIdIn(ids.into_iter().map(Into::into).collect()))
    }

    /// Records created within `[begin, end]`. Skipped unless both bounds are given.
    pub fn between_dates(self, begin: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        match (begin, end) {
            (Some(begin), Some(end)) => self.with(Predicate::CreatedBetween(begin, end)),
            _ => self,
        }
    }

    /// Records created at or after `date`.
    pub fn newer_than(self, date: Option<DateTime<Utc>>) -> Self {
        match date {
            Some(d) => self.with(Predicate::CreatedAtOrAfter(d)),
            None => self,
        }
    }

    /// Records created at or before `date`.
    pub fn older_than(self, date: Option<DateTime<Utc>>) -> Self {
        match date {
            Some(d) => self.with(Predicate::CreatedAtOrBefore(d)),
            None => self,
        }
    }

    pub fn version_at_least(self, version: Option<u64>) -> Self {
        match version {
            Some(v) => self.with(Predicate::VersionAtLeast(v)),
            None => self,
        }
    }

    pub fn version_at_most(self, version: Option<u64>) -> Self {
        match version {
            Some(v) => self.with(Predicate::VersionAtMost(v)),
            None => self,
        }
    }

    pub fn actor(self, actor: Option<&Actor>) -> Self {
        match actor {
            Some(a) => self.with(Predicate::Actor(a.clone())),
            None => self,
        }
    }

    pub fn action(self, action: Option<AuditAction>) -> Self {
        match action {
            Some(a) => self.with(Predicate::Action(a)),
            None => self,
        }
    }

    pub fn order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    /// Limit the number of results returned. Zero means no limit.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|l| *l > 0);
        self
    }

    fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sort_order(&self) -> SearchOrder {
        self.order
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Whether both the entity type and the entity id are pinned.
    pub fn pins_single_entity(&self) -> bool {
        let has_type = self
            .predicates
            .iter()
            .any(|p| matches!(p, Predicate::EntityType(_)));
        let has_id = self
            .predicates
            .iter()
            .any(|p| matches!(p, Predicate::EntityId(_)));
        has_type && has_id
    }

    /// Evaluate the conjunction against an in-memory record.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
