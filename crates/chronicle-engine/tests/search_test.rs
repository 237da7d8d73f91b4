//! Integration tests: search options against a populated trail.

use std::sync::Arc;

use chrono::Duration;
use serde_json::json;

use chronicle_core::config::ChronicleConfig;
use chronicle_core::models::{AuditFilter, EntityRef, Mutation, SearchOrder};
use chronicle_engine::{AuditTrail, EntityRegistry, SearchParams};
use chronicle_storage::StorageEngine;
use test_fixtures::{at_minute, attrs, InMemoryKind, ManualClock};

/// Posts 1 and 2 and Tag 1, created at minutes 0, 1, 2; post 1 updated at minute 3.
fn populated() -> AuditTrail {
    let registry = Arc::new(EntityRegistry::new());
    let posts = InMemoryKind::new("Post", &["title", "body"]);
    posts.put_live("1", attrs(json!({"title": "Rust in Production"})));
    posts.put_live("2", attrs(json!({"title": "Gardening"})));
    registry.register(posts);
    registry.register(InMemoryKind::new("Tag", &["label"]));

    let clock = ManualClock::at_base();
    let trail = AuditTrail::new(
        Arc::new(StorageEngine::open_in_memory().unwrap()),
        registry,
        ChronicleConfig::default(),
    )
    .with_clock(clock.clone());

    let creates = [
        Mutation::create(EntityRef::new("Post", "1"), attrs(json!({"title": "Rust"}))),
        Mutation::create(EntityRef::new("Post", "2"), attrs(json!({"title": "Gardening"}))),
        Mutation::create(EntityRef::new("Tag", "1"), attrs(json!({"label": "lang"}))),
    ];
    for mutation in creates {
        trail.record_mutation(mutation).unwrap();
        clock.advance(Duration::minutes(1));
    }
    trail
        .record_mutation(Mutation::update(
            EntityRef::new("Post", "1"),
            attrs(json!({"title": "Rust"})),
            attrs(json!({"title": "Rust in Production"})),
        ))
        .unwrap();
    trail
}

fn keys(records: &[chronicle_core::AuditRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!("{}@{}", r.entity, r.version))
        .collect()
}

#[test]
fn test_blank_search_returns_everything() {
    let trail = populated();
    let all = trail.search(&SearchParams::default()).unwrap();
    assert_eq!(
        keys(&all),
        vec!["Post#1@1", "Post#2@1", "Tag#1@1", "Post#1@2"]
    );
}

#[test]
fn test_entity_type_only() {
    let trail = populated();
    let posts = trail.search(&SearchParams::new().entity_type("Post")).unwrap();
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|r| r.entity.entity_type == "Post"));
}

#[test]
fn test_pinned_entity_orders_by_version() {
    let trail = populated();
    let history = trail
        .search(&SearchParams::new().entity_type("Post").entity_id("1"))
        .unwrap();
    assert_eq!(keys(&history), vec!["Post#1@1", "Post#1@2"]);
}

#[test]
fn test_date_bounds_are_inclusive() {
    let trail = populated();
    let newer = trail
        .search(&SearchParams::new().begin_date(at_minute(2)))
        .unwrap();
    assert_eq!(keys(&newer), vec!["Tag#1@1", "Post#1@2"]);

    let older = trail.search(&SearchParams::new().end_date(at_minute(1))).unwrap();
    assert_eq!(keys(&older), vec!["Post#1@1", "Post#2@1"]);

    let between = trail
        .search(
            &SearchParams::new()
                .begin_date(at_minute(1))
                .end_date(at_minute(2)),
        )
        .unwrap();
    assert_eq!(keys(&between), vec!["Post#2@1", "Tag#1@1"]);
}

#[test]
fn test_name_or_title_matches_live_title() {
    let trail = populated();
    let found = trail
        .search(&SearchParams::new().entity_type("Post").name_or_title("PRODUCTION"))
        .unwrap();
    assert_eq!(keys(&found), vec!["Post#1@1", "Post#1@2"]);

    let none = trail
        .search(&SearchParams::new().entity_type("Post").name_or_title("cooking"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_newest_first_with_limit() {
    let trail = populated();
    let latest = trail
        .search(&SearchParams::new().order(SearchOrder::Newest).limit(2))
        .unwrap();
    assert_eq!(keys(&latest), vec!["Post#1@2", "Tag#1@1"]);
}

#[test]
fn test_raw_filter_passthrough() {
    let trail = populated();
    let records = trail
        .filter(&AuditFilter::new().entity_type("Tag").version_at_least(Some(1)))
        .unwrap();
    assert_eq!(keys(&records), vec!["Tag#1@1"]);
}
