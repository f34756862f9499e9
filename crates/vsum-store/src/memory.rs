//! In-memory KV backend for development and tests.
//!
//! Expiry is lazy: a read past the deadline behaves as a miss and drops the
//! entry. All operations take the same lock, so concurrent requests see a
//! consistent map.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::kv::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Development backend; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it under the write lock.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= Instant::now() {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.expires_at > now)
            .map(|(k, _)| k.clone())
            .collect())
    }
}
