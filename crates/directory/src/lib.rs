//! Redis-backed recipient directory.
//!
//! Delivery records live under `notification:{user_id}` as JSON
//! `{"url": ..., "token": ...}`. Full reads walk the keyspace with
//! SCAN + MGET in pages of 1000 rather than KEYS, so a snapshot of a large
//! directory never stalls Redis. The snapshot is a point-in-time read in
//! the loose sense: records written while the scan is in progress may or
//! may not appear, which is fine for broadcast planning.

use std::collections::HashSet;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use herald_common::types::DeliveryRecord;
use herald_dispatch::coordinator::RecipientDirectory;

const KEY_PREFIX: &str = "notification:";
const SCAN_PAGE_SIZE: usize = 1000;

/// Recipient directory over a shared Redis connection manager.
#[derive(Clone)]
pub struct RedisDirectory {
    redis: ConnectionManager,
}

impl RedisDirectory {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(user_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, user_id)
    }

    /// Register or replace a recipient's delivery record (opt-in).
    pub async fn set_recipient(
        &self,
        user_id: &str,
        record: &DeliveryRecord,
    ) -> anyhow::Result<()> {
        let mut conn = self.redis.clone();
        let value = serde_json::to_string(record)?;
        conn.set::<_, _, ()>(Self::key(user_id), value).await?;
        Ok(())
    }

    pub async fn get_recipient(&self, user_id: &str) -> anyhow::Result<Option<DeliveryRecord>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(Self::key(user_id)).await?;
        match value {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Drop a recipient's delivery record (opt-out). Returns whether a
    /// record existed.
    pub async fn remove_recipient(&self, user_id: &str) -> anyhow::Result<bool> {
        let mut conn = self.redis.clone();
        let removed: u64 = conn.del(Self::key(user_id)).await?;
        Ok(removed > 0)
    }

    /// One SCAN step over the directory keyspace.
    async fn scan_page(
        conn: &mut ConnectionManager,
        cursor: u64,
    ) -> anyhow::Result<(u64, Vec<String>)> {
        let page: (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(format!("{}*", KEY_PREFIX))
            .arg("COUNT")
            .arg(SCAN_PAGE_SIZE)
            .query_async(conn)
            .await?;
        Ok(page)
    }

    async fn load_page(
        conn: &mut ConnectionManager,
        keys: &[String],
    ) -> anyhow::Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Option<String>> = conn.mget(keys).await?;
        Ok(values)
    }
}

impl RecipientDirectory for RedisDirectory {
    async fn snapshot(&self) -> anyhow::Result<Vec<DeliveryRecord>> {
        let mut conn = self.redis.clone();
        let mut records = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next, keys) = Self::scan_page(&mut conn, cursor).await?;
            let values = Self::load_page(&mut conn, &keys).await?;

            for (key, value) in keys.iter().zip(values) {
                // Keys can expire between SCAN and MGET.
                let Some(raw) = value else { continue };
                match serde_json::from_str::<DeliveryRecord>(&raw) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        tracing::warn!(key, error = %err, "Skipping unparsable delivery record");
                    }
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(records)
    }

    async fn delete_by_tokens(&self, tokens: Vec<String>) -> anyhow::Result<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let invalid: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        let mut conn = self.redis.clone();
        let mut doomed: Vec<String> = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next, keys) = Self::scan_page(&mut conn, cursor).await?;
            let values = Self::load_page(&mut conn, &keys).await?;

            for (key, value) in keys.into_iter().zip(values) {
                let Some(raw) = value else { continue };
                if let Ok(record) = serde_json::from_str::<DeliveryRecord>(&raw) {
                    if invalid.contains(record.token.as_str()) {
                        doomed.push(key);
                    }
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if doomed.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn.del(&doomed).await?;
        Ok(removed)
    }
}
