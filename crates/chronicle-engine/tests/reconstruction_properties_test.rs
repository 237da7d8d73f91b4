//! Property tests: replaying the full history reproduces the current state.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use chronicle_core::config::ChronicleConfig;
use chronicle_core::models::{Attributes, EntityRef, Mutation};
use chronicle_engine::{AuditTrail, EntityRegistry};
use chronicle_storage::StorageEngine;
use test_fixtures::InMemoryKind;

const SCHEMA: [&str; 3] = ["a", "b", "c"];

fn snapshot() -> impl Strategy<Value = Attributes> {
    prop::collection::vec(prop::option::of(0i64..4), 3).prop_map(|values| {
        SCHEMA
            .iter()
            .zip(values)
            .map(|(name, v)| (name.to_string(), v.map_or(Value::Null, |n| json!(n))))
            .collect()
    })
}

fn trail() -> AuditTrail {
    let registry = Arc::new(EntityRegistry::new());
    registry.register(InMemoryKind::new("Doc", &SCHEMA));
    AuditTrail::new(
        Arc::new(StorageEngine::open_in_memory().unwrap()),
        registry,
        ChronicleConfig::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_latest_revision_equals_current_state(
        states in prop::collection::vec(snapshot(), 1..12),
        delete in any::<bool>(),
    ) {
        let trail = trail();
        let entity = EntityRef::new("Doc", "1");

        trail.record_mutation(Mutation::create(entity.clone(), states[0].clone())).unwrap();
        for pair in states.windows(2) {
            trail
                .record_mutation(Mutation::update(entity.clone(), pair[0].clone(), pair[1].clone()))
                .unwrap();
        }
        let current = states[states.len() - 1].clone();
        if delete {
            trail.record_mutation(Mutation::delete(entity.clone(), current.clone())).unwrap();
        }

        let latest = trail.next_version(&entity).unwrap() - 1;
        let rev = trail.reconstruct("Doc", "1", latest).unwrap().unwrap();
        if delete {
            prop_assert!(rev.is_deleted());
            prop_assert!(rev.attributes.values().all(Value::is_null));
        } else {
            prop_assert_eq!(rev.attributes, current);
        }
    }

    #[test]
    fn prop_intermediate_revision_matches_snapshot(
        states in prop::collection::vec(snapshot(), 1..10),
    ) {
        let trail = trail();
        let entity = EntityRef::new("Doc", "1");

        let mut expected = Vec::new();
        let created = trail
            .record_mutation(Mutation::create(entity.clone(), states[0].clone()))
            .unwrap()
            .unwrap();
        expected.push((created.version, states[0].clone()));
        for pair in states.windows(2) {
            if let Some(record) = trail
                .record_mutation(Mutation::update(entity.clone(), pair[0].clone(), pair[1].clone()))
                .unwrap()
            {
                expected.push((record.version, pair[1].clone()));
            }
        }

        for (version, state) in expected {
            let rev = trail.reconstruct("Doc", "1", version).unwrap().unwrap();
            prop_assert_eq!(rev.version, version);
            prop_assert_eq!(rev.attributes, state);
        }
    }
}
