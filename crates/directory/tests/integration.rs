//! Integration tests for the Redis recipient directory.
//!
//! Requires a running Redis instance. Run with:
//!
//! ```bash
//! REDIS_URL="redis://localhost:6379" \
//!   cargo test -p herald-directory --test integration -- --ignored --nocapture
//! ```

use redis::aio::ConnectionManager;

use herald_common::redis_pool::create_redis_pool;
use herald_common::types::DeliveryRecord;
use herald_directory::RedisDirectory;
use herald_dispatch::coordinator::RecipientDirectory;

// ============================================================
// Helpers
// ============================================================

async fn connect() -> ConnectionManager {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    create_redis_pool(&url).await.unwrap()
}

/// Remove every directory key so tests start from an empty keyspace.
async fn clear_directory(conn: &mut ConnectionManager) {
    let mut cursor = 0u64;
    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg("notification:*")
            .arg("COUNT")
            .arg(1000)
            .query_async(conn)
            .await
            .unwrap();

        if !keys.is_empty() {
            let _: u64 = redis::cmd("DEL")
                .arg(&keys)
                .query_async(conn)
                .await
                .unwrap();
        }

        cursor = next;
        if cursor == 0 {
            break;
        }
    }
}

fn record(url: &str, token: &str) -> DeliveryRecord {
    DeliveryRecord {
        url: url.to_string(),
        token: token.to_string(),
    }
}

// ============================================================
// Recipient CRUD
// ============================================================

#[tokio::test]
#[ignore]
async fn test_set_get_remove_roundtrip() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;
    let directory = RedisDirectory::new(conn);

    let rec = record("https://provider.example/send", "tok-1");
    directory.set_recipient("user-1", &rec).await.unwrap();

    let loaded = directory.get_recipient("user-1").await.unwrap();
    assert_eq!(loaded, Some(rec));

    assert!(directory.remove_recipient("user-1").await.unwrap());
    assert!(!directory.remove_recipient("user-1").await.unwrap());
    assert_eq!(directory.get_recipient("user-1").await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_set_overwrites_existing_record() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;
    let directory = RedisDirectory::new(conn);

    directory
        .set_recipient("user-2", &record("https://old.example", "old"))
        .await
        .unwrap();
    directory
        .set_recipient("user-2", &record("https://new.example", "new"))
        .await
        .unwrap();

    let loaded = directory.get_recipient("user-2").await.unwrap().unwrap();
    assert_eq!(loaded.url, "https://new.example");
    assert_eq!(loaded.token, "new");
}

// ============================================================
// Snapshot + cleanup
// ============================================================

#[tokio::test]
#[ignore]
async fn test_snapshot_returns_all_records() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;
    let directory = RedisDirectory::new(conn);

    for i in 0..25 {
        directory
            .set_recipient(
                &format!("user-{}", i),
                &record("https://provider.example/send", &format!("tok-{}", i)),
            )
            .await
            .unwrap();
    }

    let snapshot = directory.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 25);
}

#[tokio::test]
#[ignore]
async fn test_snapshot_skips_unparsable_values() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;

    let _: () = redis::cmd("SET")
        .arg("notification:broken")
        .arg("not json")
        .query_async(&mut conn)
        .await
        .unwrap();

    let directory = RedisDirectory::new(conn);
    directory
        .set_recipient("user-3", &record("https://provider.example/send", "tok-3"))
        .await
        .unwrap();

    let snapshot = directory.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].token, "tok-3");
}

#[tokio::test]
#[ignore]
async fn test_delete_by_tokens_removes_only_matches() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;
    let directory = RedisDirectory::new(conn);

    directory
        .set_recipient("user-a", &record("https://provider.example/send", "keep"))
        .await
        .unwrap();
    directory
        .set_recipient("user-b", &record("https://provider.example/send", "drop-1"))
        .await
        .unwrap();
    directory
        .set_recipient("user-c", &record("https://provider.example/send", "drop-2"))
        .await
        .unwrap();

    let removed = directory
        .delete_by_tokens(vec!["drop-1".to_string(), "drop-2".to_string()])
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let snapshot = directory.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].token, "keep");
}

#[tokio::test]
#[ignore]
async fn test_delete_by_tokens_with_empty_input_is_a_noop() {
    let mut conn = connect().await;
    clear_directory(&mut conn).await;
    let directory = RedisDirectory::new(conn);

    directory
        .set_recipient("user-d", &record("https://provider.example/send", "tok-d"))
        .await
        .unwrap();

    let removed = directory.delete_by_tokens(Vec::new()).await.unwrap();
    assert_eq!(removed, 0);
    assert_eq!(directory.snapshot().await.unwrap().len(), 1);
}
