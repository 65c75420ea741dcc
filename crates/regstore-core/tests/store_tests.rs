//! Integration tests for the RegisterStore public interface.
//!
//! These tests exercise the store through its public API only: creation,
//! deletion, reads, writes, enumeration, and behavior under concurrent use.

use futures::future::join_all;
use regstore_core::{ErrorKind, RegisterError, RegisterStore};
use std::sync::Arc;

#[tokio::test]
async fn test_fresh_array_reads_zero_everywhere() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();

    for index in 0..16 {
        assert_eq!(store.read_item("test", index).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_create_existing_name_fails_without_mutation() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();
    store.write_item("test", 5, 55).await.unwrap();
    let before = store.get("test").await.unwrap();

    let err = store.create("test", 16).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::AlreadyExists));

    assert_eq!(store.get("test").await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_then_recreate_is_fresh() {
    let store = RegisterStore::new();

    let err = store.delete("test").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    store.create("test", 8).await.unwrap();
    store.write_item("test", 1, 11).await.unwrap();
    store.write_item("test", 2, 22).await.unwrap();

    store.delete("test").await.unwrap();
    store.create("test", 8).await.unwrap();

    let snapshot = store.get("test").await.unwrap();
    assert_eq!(snapshot.size, 0);
    assert_eq!(snapshot.items, vec![0; 8]);
}

#[tokio::test]
async fn test_write_then_read_returns_value() {
    let store = RegisterStore::new();
    store.create("test", 32).await.unwrap();

    for index in 0..32u32 {
        let value = index.wrapping_mul(2_654_435_761);
        store.write_item("test", index, value).await.unwrap();
        assert_eq!(store.read_item("test", index).await.unwrap(), value);
    }
    store.write_item("test", 31, u32::MAX).await.unwrap();
    assert_eq!(store.read_item("test", 31).await.unwrap(), u32::MAX);
}

#[tokio::test]
async fn test_index_at_or_past_capacity_is_out_of_range() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();

    for index in [16, 17, 100, u32::MAX] {
        let err = store.read_item("test", index).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::OutOfRange));

        let err = store.write_item("test", index, 3).await.unwrap_err();
        match err {
            RegisterError::OutOfRange {
                name,
                index: reported,
                capacity,
            } => {
                assert_eq!(name, "test");
                assert_eq!(reported, index);
                assert_eq!(capacity, 16);
            }
            other => panic!("Expected OutOfRange, got: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_get_all_two_arrays() {
    let store = RegisterStore::new();
    store.create("a", 16).await.unwrap();
    store.create("b", 32).await.unwrap();

    let all = store.get_all().await;
    assert_eq!(all.len(), 2);

    assert_eq!(all[0].name, "a");
    assert_eq!(all[0].capacity, 16);
    assert_eq!(all[0].items, vec![0; 16]);

    assert_eq!(all[1].name, "b");
    assert_eq!(all[1].capacity, 32);
    assert_eq!(all[1].items, vec![0; 32]);
}

#[tokio::test]
async fn test_overwrite_counts_one_distinct_index() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();

    store.write_item("test", 0, 100).await.unwrap();
    store.write_item("test", 0, 200).await.unwrap();

    assert_eq!(store.read_item("test", 0).await.unwrap(), 200);
    assert_eq!(store.get("test").await.unwrap().size, 1);
}

#[tokio::test]
async fn test_size_tracks_distinct_indices() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();

    for (index, value) in [(0, 100), (0, 200), (1, 2), (1, 3), (7, 0)] {
        store.write_item("test", index, value).await.unwrap();
    }

    let snapshot = store.get("test").await.unwrap();
    assert_eq!(snapshot.size, 3);
    assert_eq!(snapshot.capacity, 16);
}

#[tokio::test]
async fn test_rejected_write_leaves_array_untouched() {
    let store = RegisterStore::new();
    store.create("t", 10).await.unwrap();

    let err = store.write_item("t", 18, 366).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::OutOfRange));

    let snapshot = store.get("t").await.unwrap();
    assert_eq!(snapshot.size, 0);
    assert_eq!(snapshot.items, vec![0; 10]);
}

#[tokio::test]
async fn test_deleted_array_is_not_found() {
    let store = RegisterStore::new();
    store.create("test", 16).await.unwrap();
    store.delete("test").await.unwrap();

    let err = store.get("test").await.unwrap_err();
    assert!(matches!(err, RegisterError::NotFound { ref name } if name == "test"));
}

#[tokio::test]
async fn test_snapshot_does_not_follow_later_writes() {
    let store = RegisterStore::new();
    store.create("test", 4).await.unwrap();

    let snapshot = store.get("test").await.unwrap();
    store.write_item("test", 0, 9).await.unwrap();

    assert_eq!(snapshot.items[0], 0);
    assert_eq!(store.get("test").await.unwrap().items[0], 9);
}

#[tokio::test]
async fn test_sample_session() {
    let store = RegisterStore::new();

    store.create("test", 16).await.unwrap();
    assert!(store.create("test", 16).await.is_err());
    store.create("test1", 32).await.unwrap();
    assert_eq!(store.read_item("test1", 1).await.unwrap(), 0);
    assert!(store.read_item("test1", 55).await.is_err());

    store.write_item("test", 0, 100).await.unwrap();
    store.write_item("test", 0, 200).await.unwrap();
    store.write_item("test", 1, 2).await.unwrap();
    store.write_item("test", 1, 3).await.unwrap();
    store.write_item("test1", 0, 3).await.unwrap();
    store.write_item("test1", 1, 333).await.unwrap();
    store.write_item("test1", 2, 355).await.unwrap();
    store.write_item("test1", 18, 366).await.unwrap();
    assert!(store.write_item("test1", 32, 388).await.is_err());
    assert!(store.write_item("test", 100, 3).await.is_err());

    assert_eq!(store.read_item("test", 0).await.unwrap(), 200);
    assert_eq!(store.read_item("test", 1).await.unwrap(), 3);

    let test1 = store.get("test1").await.unwrap();
    assert_eq!(test1.size, 4);
    assert_eq!(&test1.items[..3], &[3, 333, 355]);
    assert_eq!(test1.items[18], 366);

    store.delete("test1").await.unwrap();
    assert!(store.get("test1").await.is_err());
    assert_eq!(store.get_all().await.len(), 1);
    store.delete("test").await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_of_one_name_succeed_once() {
    let store = Arc::new(RegisterStore::new());

    let tasks = (0..32).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.create("shared", 8).await })
    });
    let results = join_all(tasks).await;

    let successes = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|result| result.is_ok())
        .count();
    assert_eq!(successes, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_distinct_indices() {
    let store = Arc::new(RegisterStore::new());
    store.create("a", 64).await.unwrap();
    store.create("b", 64).await.unwrap();

    let mut tasks = Vec::new();
    for index in 0..64u32 {
        for name in ["a", "b"] {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.write_item(name, index, index + 1).await
            }));
        }
    }
    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    for name in ["a", "b"] {
        let snapshot = store.get(name).await.unwrap();
        assert_eq!(snapshot.size, 64);
        let expected: Vec<u32> = (1..=64).collect();
        assert_eq!(snapshot.items, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_state() {
    let store = Arc::new(RegisterStore::new());
    store.create("flip", 1).await.unwrap();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for round in 0..500u32 {
                let value = if round % 2 == 0 { 0xAAAA_AAAA } else { 0x5555_5555 };
                store.write_item("flip", 0, value).await.unwrap();
            }
        })
    };

    let readers = (0..4).map(|_| {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                let value = store.read_item("flip", 0).await.unwrap();
                assert!(matches!(value, 0 | 0xAAAA_AAAA | 0x5555_5555));
            }
        })
    });

    for joined in join_all(readers).await {
        joined.unwrap();
    }
    writer.await.unwrap();
}
