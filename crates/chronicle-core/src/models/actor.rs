use std::fmt;

use serde::{Deserialize, Serialize};

use super::EntityRef;

/// The party responsible for a mutation.
///
/// Either a free-text label or a reference to another entity, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Named { label: String },
    Identified { entity: EntityRef },
}

impl Actor {
    pub fn named(label: impl Into<String>) -> Self {
        Self::Named {
            label: label.into(),
        }
    }

    pub fn identified(entity: EntityRef) -> Self {
        Self::Identified { entity }
    }

    /// Replace this actor with a free-text label, discarding any reference.
    pub fn set_label(&mut self, label: impl Into<String>) {
        *self = Self::named(label);
    }

    /// Replace this actor with an entity reference, discarding any label.
    pub fn set_reference(&mut self, entity: EntityRef) {
        *self = Self::identified(entity);
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Named { label } => Some(label),
            Self::Identified { .. } => None,
        }
    }

    pub fn reference(&self) -> Option<&EntityRef> {
        match self {
            Self::Named { .. } => None,
            Self::Identified { entity } => Some(entity),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { label } => f.write_str(label),
            Self::Identified { entity } => entity.fmt(f),
        }
    }
}

impl From<&str> for Actor {
    fn from(label: &str) -> Self {
        Self::named(label)
    }
}

impl From<EntityRef> for Actor {
    fn from(entity: EntityRef) -> Self {
        Self::identified(entity)
    }
}
