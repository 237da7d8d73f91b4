//! Translate loosely-specified search options into an `AuditFilter`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chronicle_core::constants::DISPLAY_ATTRIBUTES;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditFilter, SearchOrder};

use crate::registry::EntityRegistry;

/// Search options. Every field is optional; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Case-insensitive substring of the entity's `name` (or `title`).
    /// Only applies together with `entity_type`.
    pub name_or_title: Option<String>,
    pub begin_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub order: SearchOrder,
    pub limit: Option<usize>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn name_or_title(mut self, needle: impl Into<String>) -> Self {
        self.name_or_title = Some(needle.into());
        self
    }

    pub fn begin_date(mut self, at: DateTime<Utc>) -> Self {
        self.begin_date = Some(at);
        self
    }

    pub fn end_date(mut self, at: DateTime<Utc>) -> Self {
        self.end_date = Some(at);
        self
    }

    pub fn order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Build the filter for `params`, resolving `name_or_title` through the registry.
pub fn build_filter(params: &SearchParams, registry: &EntityRegistry) -> ChronicleResult<AuditFilter> {
    let entity_type = non_blank(params.entity_type.as_deref());

    let mut filter = AuditFilter::new()
        .entity_type(entity_type.unwrap_or_default())
        .entity_id(params.entity_id.as_deref().unwrap_or_default());

    filter = match (params.begin_date, params.end_date) {
        (Some(_), Some(_)) => filter.between_dates(params.begin_date, params.end_date),
        (begin, None) => filter.newer_than(begin),
        (None, end) => filter.older_than(end),
    };

    if let (Some(entity_type), Some(needle)) =
        (entity_type, non_blank(params.name_or_title.as_deref()))
    {
        let kind = registry.resolve(entity_type)?;
        match DISPLAY_ATTRIBUTES.iter().find(|a| kind.has_attribute(a)) {
            Some(attribute) => {
                let ids = kind.find_ids_containing(attribute, needle)?;
                tracing::debug!(
                    entity_type,
                    attribute = *attribute,
                    matches = ids.len(),
                    "resolved display-attribute search"
                );
                filter = filter.entity_ids(ids);
            }
            None => {
                tracing::debug!(entity_type, "kind has no name or title attribute, ignoring");
            }
        }
    }

    Ok(filter.order(params.order).limit(params.limit))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
