//! Integration tests for the read-through accessor
//!
//! Tests cover:
//! 1. Save/get round trip through the hot tier
//! 2. Cold fallback and detached pre-warm into hot
//! 3. Delete across both tiers (lossy one-tier-success policy)
//! 4. List union without de-duplication, degraded on tier failure
//! 5. Hot-tier errors other than NotFound still fall back to cold

mod common;

use common::{payload, record_at, test_clock, wait_until_present, FailingTier, Op};
use std::sync::Arc;
use tempfile::TempDir;
use tierstore_core::{CoreError, Record};
use tierstore_storage::{Accessor, FileTier, MemoryTier, Storage};

/// Helper: hot memory tier + cold file tier sharing one manual clock
async fn create_test_accessor() -> (Accessor, Arc<MemoryTier>, Arc<FileTier>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let clock = test_clock();
    let hot = Arc::new(MemoryTier::with_clock(clock.clone()));
    let cold = Arc::new(
        FileTier::with_clock(temp_dir.path().join("cold"), clock)
            .await
            .expect("Failed to open file tier"),
    );
    let accessor = Accessor::new(hot.clone(), cold.clone());
    (accessor, hot, cold, temp_dir)
}

#[tokio::test]
async fn test_round_trip() {
    let (accessor, _hot, _cold, _temp_dir) = create_test_accessor().await;
    let mut record = Record::new("x", payload("v"));
    record.access_count = 4;

    accessor.save(record.clone()).await.unwrap();
    let fetched = accessor.get("x").await.unwrap();

    assert_eq!(fetched.id, "x");
    assert_eq!(fetched.payload, record.payload);
    assert_eq!(fetched.access_count, record.access_count + 1);
}

#[tokio::test]
async fn test_save_rejects_ids_the_cold_tier_cannot_hold() {
    let (accessor, hot, _cold, _temp_dir) = create_test_accessor().await;

    for id in ["a/b", "..", ""] {
        let result = accessor.save(Record::new(id, payload("v"))).await;
        assert!(
            matches!(result, Err(CoreError::ValidationError(_))),
            "{id:?} should be rejected, got {result:?}"
        );
    }
    assert!(hot.is_empty());
}

#[tokio::test]
async fn test_save_never_writes_cold() {
    let (accessor, hot, cold, _temp_dir) = create_test_accessor().await;

    accessor.save(Record::new("x", payload("v"))).await.unwrap();

    assert_eq!(hot.len(), 1);
    assert!(cold.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cold_fallback_prewarms_hot() {
    let (accessor, hot, cold, _temp_dir) = create_test_accessor().await;
    cold.save(Record::new("x", payload("v"))).await.unwrap();
    assert!(hot.is_empty());

    let fetched = accessor.get("x").await.unwrap();
    assert_eq!(fetched.payload, payload("v"));

    assert!(
        wait_until_present(hot.as_ref(), "x").await,
        "pre-warm should copy the record into hot"
    );
    let from_hot = hot.get("x").await.unwrap();
    assert_eq!(from_hot.payload, payload("v"));
    // cold get bumped to 1, hot get bumps the copy to 2
    assert_eq!(from_hot.access_count, 2);
}

#[tokio::test]
async fn test_miss_in_both_tiers() {
    let (accessor, _hot, _cold, _temp_dir) = create_test_accessor().await;
    let result = accessor.get("missing").await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_hot_error_falls_back_to_cold() {
    let clock = test_clock();
    let hot = Arc::new(FailingTier::new("hot", clock.clone()));
    let cold = Arc::new(MemoryTier::with_clock(clock.clone()));
    let accessor = Accessor::new(hot.clone(), cold.clone());

    hot.inner().save(record_at("x", &clock)).await.unwrap();
    cold.save(record_at("x", &clock)).await.unwrap();
    hot.set_failing(Op::Get, true);

    let fetched = accessor.get("x").await.unwrap();
    assert_eq!(fetched.access_count, 1);
    assert_eq!(cold.list().await.unwrap()[0].access_count, 1);
}

#[tokio::test]
async fn test_cold_error_is_returned() {
    let clock = test_clock();
    let hot = Arc::new(MemoryTier::with_clock(clock.clone()));
    let cold = Arc::new(FailingTier::new("cold", clock.clone()));
    let accessor = Accessor::new(hot, cold.clone());

    cold.set_failing(Op::Get, true);
    let result = accessor.get("x").await;
    assert!(matches!(result, Err(CoreError::StorageFailed(_))));
}

#[tokio::test]
async fn test_prewarm_failure_is_swallowed() {
    let clock = test_clock();
    let hot = Arc::new(FailingTier::new("hot", clock.clone()));
    let cold = Arc::new(MemoryTier::with_clock(clock.clone()));
    let accessor = Accessor::new(hot.clone(), cold.clone());

    cold.save(record_at("x", &clock)).await.unwrap();
    hot.set_failing(Op::Save, true);

    let fetched = accessor.get("x").await.unwrap();
    assert_eq!(fetched.id, "x");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(hot.inner().is_empty());
}

#[tokio::test]
async fn test_delete_twice_is_not_an_error() {
    let (accessor, hot, cold, _temp_dir) = create_test_accessor().await;
    accessor.save(Record::new("in-hot", payload("v"))).await.unwrap();
    cold.save(Record::new("in-cold", payload("v"))).await.unwrap();

    for id in ["in-hot", "in-cold"] {
        accessor.delete(id).await.unwrap();
        accessor.delete(id).await.unwrap();
    }

    assert!(hot.is_empty());
    assert!(cold.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_both_copies() {
    let (accessor, hot, cold, _temp_dir) = create_test_accessor().await;
    hot.save(Record::new("x", payload("v"))).await.unwrap();
    cold.save(Record::new("x", payload("v"))).await.unwrap();

    accessor.delete("x").await.unwrap();

    assert!(hot.is_empty());
    assert!(cold.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_succeeds_when_one_tier_fails() {
    let clock = test_clock();
    let hot = Arc::new(FailingTier::new("hot", clock.clone()));
    let cold = Arc::new(MemoryTier::with_clock(clock.clone()));
    let accessor = Accessor::new(hot.clone(), cold.clone());

    hot.inner().save(record_at("x", &clock)).await.unwrap();
    cold.save(record_at("x", &clock)).await.unwrap();
    hot.set_failing(Op::Delete, true);

    // Lossy: reported as success although the hot copy survives
    accessor.delete("x").await.unwrap();
    assert!(cold.is_empty());
    assert_eq!(hot.inner().len(), 1);
}

#[tokio::test]
async fn test_delete_fails_when_both_tiers_fail() {
    let clock = test_clock();
    let hot = Arc::new(FailingTier::new("hot", clock.clone()));
    let cold = Arc::new(FailingTier::new("cold", clock.clone()));
    let accessor = Accessor::new(hot.clone(), cold.clone());

    hot.set_failing(Op::Delete, true);
    cold.set_failing(Op::Delete, true);

    let result = accessor.delete("x").await;
    assert!(matches!(result, Err(CoreError::StorageFailed(_))));
}

#[tokio::test]
async fn test_list_union_and_duplicates() {
    let (accessor, hot, cold, _temp_dir) = create_test_accessor().await;
    hot.save(Record::new("a", payload("v"))).await.unwrap();
    cold.save(Record::new("b", payload("v"))).await.unwrap();

    let mut ids: Vec<String> = accessor.list().await.unwrap().into_iter().map(|r| r.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    // Same id transiently in both tiers shows up twice
    cold.save(Record::new("a", payload("v"))).await.unwrap();
    let dupes = accessor
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.id == "a")
        .count();
    assert_eq!(dupes, 2);
}

#[tokio::test]
async fn test_list_degrades_on_tier_failure() {
    let clock = test_clock();
    let hot = Arc::new(MemoryTier::with_clock(clock.clone()));
    let cold = Arc::new(FailingTier::new("cold", clock.clone()));
    let accessor = Accessor::new(hot.clone(), cold.clone());

    hot.save(record_at("a", &clock)).await.unwrap();
    cold.inner().save(record_at("b", &clock)).await.unwrap();
    cold.set_failing(Op::List, true);

    let records = accessor.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "a");
}
