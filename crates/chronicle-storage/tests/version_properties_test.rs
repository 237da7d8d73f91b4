//! Property tests: per-entity versions stay dense for arbitrary interleavings.

use std::collections::BTreeMap;

use chrono::Utc;
use proptest::prelude::*;

use chronicle_core::models::*;
use chronicle_core::traits::IAuditStorage;
use chronicle_storage::StorageEngine;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_versions_dense_per_entity(writes in prop::collection::vec(0u8..4, 1..60)) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let mut expected: BTreeMap<u8, u64> = BTreeMap::new();

        for which in &writes {
            let entity = EntityRef::new("Doc", which.to_string());
            let record = engine
                .append(&RecordDraft {
                    entity,
                    action: AuditAction::Update,
                    changes: ChangeSet::new(),
                    actor: None,
                    comment: None,
                    created_at: Utc::now(),
                })
                .unwrap();
            let counter = expected.entry(*which).or_insert(0);
            *counter += 1;
            prop_assert_eq!(record.version, *counter);
        }

        for (which, count) in expected {
            let entity = EntityRef::new("Doc", which.to_string());
            let versions: Vec<u64> = engine
                .query_by_entity(&entity, None)
                .unwrap()
                .iter()
                .map(|r| r.version)
                .collect();
            prop_assert_eq!(versions, (1..=count).collect::<Vec<_>>());
        }
    }
}
