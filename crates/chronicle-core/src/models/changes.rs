//! ChangeSet: the attribute-level diff carried by one audit record.
//!
//! Encoded as a JSON object mapping each attribute to a two-element
//! `[old, new]` array. JSON `null` stands for "absent".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ChronicleError, ChronicleResult};

/// Attribute snapshot of an entity.
pub type Attributes = BTreeMap<String, Value>;

/// Before/after values of a single attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Value, Value)", into = "(Value, Value)")]
pub struct AttributeChange {
    pub old: Value,
    pub new: Value,
}

impl From<(Value, Value)> for AttributeChange {
    fn from((old, new): (Value, Value)) -> Self {
        Self { old, new }
    }
}

impl From<AttributeChange> for (Value, Value) {
    fn from(change: AttributeChange) -> Self {
        (change.old, change.new)
    }
}

/// Ordered mapping from attribute name to its change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: BTreeMap<String, AttributeChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every attribute of `after`, with no prior value.
    pub fn for_create(after: &Attributes) -> Self {
        after
            .iter()
            .map(|(name, value)| (name.clone(), (Value::Null, value.clone())))
            .collect()
    }

    /// Every attribute of `before`, with no resulting value.
    pub fn for_delete(before: &Attributes) -> Self {
        before
            .iter()
            .map(|(name, value)| (name.clone(), (value.clone(), Value::Null)))
            .collect()
    }

    /// Only the attributes whose value differs between the two snapshots.
    /// An attribute present on one side only is paired with `null`.
    pub fn for_update(before: &Attributes, after: &Attributes) -> Self {
        let mut set = Self::new();
        for name in before.keys().chain(after.keys()) {
            if set.changes.contains_key(name) {
                continue;
            }
            let old = before.get(name).unwrap_or(&Value::Null);
            let new = after.get(name).unwrap_or(&Value::Null);
            if old != new {
                set.insert(name.clone(), old.clone(), new.clone());
            }
        }
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, old: Value, new: Value) {
        self.changes.insert(name.into(), AttributeChange { old, new });
    }

    /// Drop the named attributes.
    pub fn without<S: AsRef<str>>(mut self, ignored: &[S]) -> Self {
        for name in ignored {
            self.changes.remove(name.as_ref());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeChange> {
        self.changes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeChange)> {
        self.changes.iter()
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Attribute values as they stood after the mutation.
    pub fn new_attributes(&self) -> Attributes {
        self.changes
            .iter()
            .map(|(name, change)| (name.clone(), change.new.clone()))
            .collect()
    }

    /// Attribute values as they stood before the mutation.
    pub fn old_attributes(&self) -> Attributes {
        self.changes
            .iter()
            .map(|(name, change)| (name.clone(), change.old.clone()))
            .collect()
    }

    pub fn encode(&self) -> ChronicleResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the stored form of the changes of `record_id`.
    /// Blank input is an empty change set.
    pub fn decode(record_id: &str, text: &str) -> ChronicleResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(text).map_err(|e| ChronicleError::MalformedDiff {
            record_id: record_id.to_string(),
            reason: e.to_string(),
        })
    }
}

impl FromIterator<(String, (Value, Value))> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (String, (Value, Value))>>(iter: I) -> Self {
        Self {
            changes: iter
                .into_iter()
                .map(|(name, pair)| (name, AttributeChange::from(pair)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn update_keeps_only_changed_attributes() {
        let before = attrs(json!({"name": "A", "status": "draft", "size": 3}));
        let after = attrs(json!({"name": "B", "status": "draft", "owner": "bob"}));
        let set = ChangeSet::for_update(&before, &after);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("name").unwrap().old, json!("A"));
        assert_eq!(set.get("name").unwrap().new, json!("B"));
        assert_eq!(set.get("size").unwrap().new, Value::Null);
        assert_eq!(set.get("owner").unwrap().old, Value::Null);
        assert!(set.get("status").is_none());
    }

    #[test]
    fn appearing_null_is_not_a_change() {
        let before = attrs(json!({}));
        let after = attrs(json!({"note": null}));
        assert!(ChangeSet::for_update(&before, &after).is_empty());
    }

    #[test]
    fn projections_of_empty_set_are_empty() {
        let set = ChangeSet::new();
        assert!(set.new_attributes().is_empty());
        assert!(set.old_attributes().is_empty());
    }

    #[test]
    fn encodes_as_pairs() {
        let mut set = ChangeSet::new();
        set.insert("name", json!("A"), json!("B"));
        assert_eq!(set.encode().unwrap(), r#"{"name":["A","B"]}"#);
    }

    #[test]
    fn blank_text_decodes_to_empty() {
        assert!(ChangeSet::decode("r1", "  ").unwrap().is_empty());
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let err = ChangeSet::decode("r1", r#"{"name":["A"]}"#).unwrap_err();
        assert!(matches!(err, ChronicleError::MalformedDiff { ref record_id, .. } if record_id == "r1"));
    }

    #[test]
    fn ignored_attributes_are_dropped() {
        let after = attrs(json!({"name": "A", "updated_at": "2026-01-01"}));
        let set = ChangeSet::for_create(&after).without(&["updated_at"]);
        assert_eq!(set.attribute_names().collect::<Vec<_>>(), vec!["name"]);
    }
}
