//! EntityRegistry — maps recorded type tags to the host's entity kinds.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use chronicle_core::errors::{ChronicleError, ChronicleResult};
use chronicle_core::traits::EntityKind;

static GLOBAL: OnceLock<Arc<EntityRegistry>> = OnceLock::new();

/// Thread-safe registration table using `DashMap` for concurrent access.
#[derive(Default)]
pub struct EntityRegistry {
    kinds: DashMap<String, Arc<dyn EntityKind>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, populated at startup.
    pub fn global() -> Arc<EntityRegistry> {
        GLOBAL.get_or_init(|| Arc::new(Self::new())).clone()
    }

    /// Register a kind under its type name. Returns the kind it replaced.
    pub fn register(&self, kind: Arc<dyn EntityKind>) -> Option<Arc<dyn EntityKind>> {
        let type_name = kind.type_name().to_string();
        tracing::debug!(entity_type = %type_name, "registered entity kind");
        self.kinds.insert(type_name, kind)
    }

    pub fn resolve(&self, entity_type: &str) -> ChronicleResult<Arc<dyn EntityKind>> {
        self.kinds
            .get(entity_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ChronicleError::EntityTypeUnresolvable {
                entity_type: entity_type.to_string(),
            })
    }

    pub fn is_registered(&self, entity_type: &str) -> bool {
        self.kinds.contains_key(entity_type)
    }

    /// Registered type names, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.kinds.iter().map(|r| r.key().clone()).collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}
