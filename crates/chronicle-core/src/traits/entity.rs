use serde_json::Value;

use crate::errors::ChronicleResult;
use crate::models::{Attributes, EntityRef};

/// A live or reconstructed instance of a tracked entity.
pub trait TrackedEntity: Send + Sync + std::fmt::Debug {
    fn entity_ref(&self) -> EntityRef;

    /// Whether this instance can hold the named attribute.
    fn has_attribute(&self, name: &str) -> bool;

    fn get_attribute(&self, name: &str) -> Option<Value>;

    /// Assign an attribute. Returns `false`, leaving the instance untouched,
    /// when the attribute is not supported.
    fn set_attribute(&mut self, name: &str, value: Value) -> bool;

    /// Current attribute snapshot.
    fn attributes(&self) -> Attributes;
}

/// A concrete entity kind known to the registry.
///
/// Implemented by the host application; Chronicle never stores entities.
pub trait EntityKind: Send + Sync {
    /// The type tag recorded in audit records.
    fn type_name(&self) -> &str;

    /// Whether the kind's schema has the named attribute.
    fn has_attribute(&self, name: &str) -> bool;

    /// Fresh default instance carrying only its identity.
    fn instantiate(&self, entity_id: &str) -> Box<dyn TrackedEntity>;

    /// The live instance, if it currently exists.
    fn find_live(&self, entity_id: &str) -> ChronicleResult<Option<Box<dyn TrackedEntity>>>;

    /// Ids of live entities whose `attribute` contains `needle`
    /// (case-insensitive).
    fn find_ids_containing(&self, attribute: &str, needle: &str) -> ChronicleResult<Vec<String>>;
}
