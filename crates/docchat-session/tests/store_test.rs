//! End-to-end tests for the session store facade.

use std::time::Duration;

use docchat_session::{
    DocumentSession, SessionStore, StoreConfig, StoreError, generate_session_id,
};

fn store_with(config: StoreConfig) -> SessionStore<DocumentSession> {
    SessionStore::open(config).unwrap()
}

fn basic_store(dir: &std::path::Path) -> SessionStore<DocumentSession> {
    store_with(StoreConfig::new(dir).with_listing_ttl(Duration::ZERO))
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    let id = generate_session_id();
    store
        .save(&id, DocumentSession::new(vec![1, 2, 3]), Some("10.0.0.1"))
        .await
        .unwrap();

    let loaded = store.load(&id).await.unwrap();
    assert_eq!(loaded.index(), Some([1u8, 2, 3].as_slice()));
}

#[tokio::test]
async fn load_of_unknown_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    let err = store.load("never-saved").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    store
        .save("s1", DocumentSession::new(vec![1]), Some("10.0.0.1"))
        .await
        .unwrap();

    store.delete("s1").await.unwrap();
    assert!(matches!(
        store.load("s1").await.unwrap_err(),
        StoreError::NotFound(_)
    ));

    // Second delete reports NotFound rather than failing hard.
    assert!(matches!(
        store.delete("s1").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(store.sessions_for_client("10.0.0.1").is_empty());
}

#[tokio::test]
async fn quota_keeps_the_most_recent_registrations() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(
        StoreConfig::new(dir.path())
            .with_max_sessions_per_client(3)
            .with_listing_ttl(Duration::ZERO),
    );

    for i in 0..7 {
        store
            .save(
                &format!("s{i}"),
                DocumentSession::new(vec![i]),
                Some("10.0.0.1"),
            )
            .await
            .unwrap();
    }

    assert_eq!(store.sessions_for_client("10.0.0.1"), vec!["s4", "s5", "s6"]);

    // FIFO-evicted sessions are gone from every tier, not just the tracker.
    for i in 0..4 {
        assert!(matches!(
            store.load(&format!("s{i}")).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }
    for i in 4..7 {
        assert!(store.load(&format!("s{i}")).await.is_ok());
    }
}

#[tokio::test]
async fn quota_is_per_client() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(
        StoreConfig::new(dir.path())
            .with_max_sessions_per_client(1)
            .with_listing_ttl(Duration::ZERO),
    );

    store
        .save("a", DocumentSession::new(vec![1]), Some("10.0.0.1"))
        .await
        .unwrap();
    store
        .save("b", DocumentSession::new(vec![2]), Some("10.0.0.2"))
        .await
        .unwrap();

    // Different clients never evict each other.
    assert!(store.load("a").await.is_ok());
    assert!(store.load("b").await.is_ok());
}

#[tokio::test]
async fn hot_eviction_never_loses_data() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(
        StoreConfig::new(dir.path())
            .with_hot_capacity(2)
            .with_listing_ttl(Duration::ZERO),
    );

    store.save("a", DocumentSession::new(vec![1]), None).await.unwrap();
    store.save("b", DocumentSession::new(vec![2]), None).await.unwrap();
    store.save("c", DocumentSession::new(vec![3]), None).await.unwrap();

    // "a" was pushed out of the hot tier, but the durable record remains
    // and the load path promotes it back.
    let loaded = store.load("a").await.unwrap();
    assert_eq!(loaded.index(), Some([1u8].as_slice()));

    let stats = store.cache_stats().await;
    assert_eq!(stats.size, 2);
}

#[tokio::test]
async fn survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = basic_store(dir.path());
        store
            .save("s1", DocumentSession::new(vec![9]), Some("10.0.0.1"))
            .await
            .unwrap();
    }

    // A fresh store over the same directory serves the session from disk.
    let reopened = basic_store(dir.path());
    let loaded = reopened.load("s1").await.unwrap();
    assert_eq!(loaded.index(), Some([9u8].as_slice()));

    // Quota state is memory-only and resets with the process.
    assert!(reopened.sessions_for_client("10.0.0.1").is_empty());
}

#[tokio::test]
async fn corrupt_record_reads_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    store.save("s1", DocumentSession::new(vec![1]), None).await.unwrap();

    // Simulate a record damaged at rest, then force the next read to go to
    // disk by reopening the store (empty hot tier).
    std::fs::write(dir.path().join("s1.json"), b"{half a rec").unwrap();
    let reopened = basic_store(dir.path());

    assert!(matches!(
        reopened.load("s1").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn unusable_payload_reads_as_not_found() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = basic_store(dir.path());
        store
            .save("s1", DocumentSession::unindexed(), None)
            .await
            .unwrap();
    }

    // Durably stored but with no index: treated as missing, not served.
    let reopened = basic_store(dir.path());
    assert!(matches!(
        reopened.load("s1").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn listing_reports_metadata_without_touching_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    store
        .save("s1", DocumentSession::new(vec![1]), Some("10.0.0.1"))
        .await
        .unwrap();

    let first = store.list_sessions().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].session_id, "s1");
    assert_eq!(first[0].client_id.as_deref(), Some("10.0.0.1"));

    tokio::time::sleep(Duration::from_millis(30)).await;

    let second = store.list_sessions().await.unwrap();
    assert_eq!(second[0].last_accessed, first[0].last_accessed);
}

#[tokio::test]
async fn sweep_expires_idle_sessions_and_spares_active_ones() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(
        StoreConfig::new(dir.path())
            .with_ttl(Duration::from_millis(300))
            .with_listing_ttl(Duration::ZERO),
    );

    store.save("idle", DocumentSession::new(vec![1]), None).await.unwrap();
    store.save("busy", DocumentSession::new(vec![2]), None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(180)).await;
    // Accessing "busy" resets its expiry clock in both tiers.
    store.load("busy").await.unwrap();
    tokio::time::sleep(Duration::from_millis(180)).await;

    let report = store.sweep_expired().await;
    assert_eq!(report.records_removed, 1);
    assert_eq!(report.failures, 0);

    assert!(matches!(
        store.load("idle").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(store.load("busy").await.is_ok());
}

#[tokio::test]
async fn sweep_removes_from_both_tiers() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(
        StoreConfig::new(dir.path())
            .with_ttl(Duration::from_millis(100))
            .with_listing_ttl(Duration::ZERO),
    );

    store.save("s1", DocumentSession::new(vec![1]), None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let report = store.sweep_expired().await;
    assert_eq!(report.hot_evicted, 1);
    assert_eq!(report.records_removed, 1);

    assert_eq!(store.cache_stats().await.size, 0);
    assert!(store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn sweep_on_an_empty_store_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let store = basic_store(dir.path());

    let report = store.sweep_expired().await;
    assert_eq!(report.hot_evicted, 0);
    assert_eq!(report.records_removed, 0);
    assert_eq!(report.failures, 0);
}
