//! Redis KV backend.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::kv::KvStore;

/// Production backend over a shared multiplexed Redis connection.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the KV endpoint. Auth is carried in the URL.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::connection_failed(format!("invalid KV URL: {}", e)))?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to KV store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix.replace('*', "\\*"));
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}
