use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use chronicle_core::models::{AuditAction, ChangeSet, EntityRef, RecordDraft};
use chronicle_core::traits::IAuditStorage;
use chronicle_storage::StorageEngine;

fn draft(entity: &EntityRef, n: u64) -> RecordDraft {
    let mut changes = ChangeSet::new();
    changes.insert("counter", json!(n), json!(n + 1));
    RecordDraft {
        entity: entity.clone(),
        action: AuditAction::Update,
        changes,
        actor: None,
        comment: None,
        created_at: Utc::now(),
    }
}

fn bench_append_single_entity(c: &mut Criterion) {
    let engine = StorageEngine::open_in_memory().unwrap();
    let entity = EntityRef::new("Counter", "hot");
    let mut n = 0;
    c.bench_function("append_single_entity", |b| {
        b.iter(|| {
            n += 1;
            engine.append(&draft(&entity, n)).unwrap()
        })
    });
}

fn bench_query_by_entity(c: &mut Criterion) {
    let engine = StorageEngine::open_in_memory().unwrap();
    let entity = EntityRef::new("Counter", "history");
    for n in 0..500 {
        engine.append(&draft(&entity, n)).unwrap();
    }
    c.bench_function("query_by_entity_500", |b| {
        b.iter(|| engine.query_by_entity(&entity, None).unwrap())
    });
}

criterion_group!(benches, bench_append_single_entity, bench_query_by_entity);
criterion_main!(benches);
