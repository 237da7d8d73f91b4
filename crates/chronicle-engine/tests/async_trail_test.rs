//! Integration tests: the trail driven from async code on a single-threaded runtime.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use chronicle_core::config::ChronicleConfig;
use chronicle_core::models::{Actor, EntityRef, Mutation};
use chronicle_engine::{current_actor, scope, with_actor, AuditTrail, EntityRegistry, SearchParams};
use chronicle_storage::StorageEngine;
use test_fixtures::{attrs, InMemoryKind};

fn memory_trail() -> AuditTrail {
    let registry = Arc::new(EntityRegistry::new());
    registry.register(InMemoryKind::new("Doc", &["title", "body"]));
    AuditTrail::new(
        Arc::new(StorageEngine::open_in_memory().unwrap()),
        registry,
        ChronicleConfig::default(),
    )
}

fn doc() -> EntityRef {
    EntityRef::new("Doc", "1")
}

#[tokio::test]
async fn test_in_memory_reads_after_async_writes() {
    let trail = memory_trail();
    trail
        .record_mutation_async(Mutation::create(doc(), attrs(json!({"title": "Draft"}))))
        .await
        .unwrap();
    trail
        .record_mutation_async(Mutation::update(
            doc(),
            attrs(json!({"title": "Draft"})),
            attrs(json!({"title": "Final"})),
        ))
        .await
        .unwrap();

    let first = trail.reconstruct("Doc", "1", 1).unwrap().unwrap();
    assert_eq!(first.attributes["title"], json!("Draft"));
    assert_eq!(trail.history(&doc()).unwrap().len(), 2);
    assert_eq!(trail.next_version(&doc()).unwrap(), 3);
    assert_eq!(trail.revisions("Doc", "1").unwrap().len(), 2);
    assert_eq!(
        trail
            .search(&SearchParams::new().entity_type("Doc"))
            .unwrap()
            .len(),
        2
    );
    let now = trail.reconstruct_at_time("Doc", "1", Utc::now()).unwrap().unwrap();
    assert_eq!(now.version, 2);
    assert_eq!(now.attributes["title"], json!("Final"));
}

#[tokio::test]
async fn test_blocking_write_inside_runtime_does_not_panic() {
    let trail = memory_trail();
    let record = trail
        .record_mutation(Mutation::create(doc(), attrs(json!({"title": "Sync"}))))
        .unwrap()
        .unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(trail.storage().path(), None);
}

#[tokio::test]
async fn test_sibling_futures_keep_their_own_actor() {
    let trail = &memory_trail();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let (scoped, sibling) = tokio::join!(
        scope("alice", async move {
            let _ = rx.await;
            trail
                .record_mutation_async(Mutation::create(
                    EntityRef::new("Doc", "a"),
                    attrs(json!({"title": "by alice"})),
                ))
                .await
                .unwrap()
                .unwrap()
        }),
        async move {
            tokio::task::yield_now().await;
            let record = trail
                .record_mutation_async(Mutation::create(
                    EntityRef::new("Doc", "b"),
                    attrs(json!({"title": "unattributed"})),
                ))
                .await
                .unwrap()
                .unwrap();
            let _ = tx.send(());
            record
        }
    );

    assert_eq!(scoped.actor, Some(Actor::named("alice")));
    assert_eq!(sibling.actor, None);
    assert_eq!(current_actor(), None);
}

#[tokio::test]
async fn test_sync_scope_inside_async_code_ends_with_its_closure() {
    let trail = memory_trail();
    let inside = with_actor("bob", || {
        trail
            .record_mutation(Mutation::create(doc(), attrs(json!({"title": "x"}))))
            .unwrap()
            .unwrap()
    });
    tokio::task::yield_now().await;
    let after = trail
        .record_mutation_async(Mutation::update(
            doc(),
            attrs(json!({"title": "x"})),
            attrs(json!({"title": "y"})),
        ))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(inside.actor, Some(Actor::named("bob")));
    assert_eq!(after.actor, None);
}
