//! Uniform key/value port.
//!
//! Values are opaque serialized records. Keys are namespaced by the callers
//! (`job:{id}`, `cache:{fingerprint}`, `rl:{class}:{identity}`); the store
//! garbage-collects expired keys on its own, so deletion is only needed for
//! explicit invalidation.

use async_trait::async_trait;

use crate::error::StoreResult;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl_seconds`.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()>;

    /// Fetch the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// List live keys beginning with `prefix`. Admin-only; may be O(n).
    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}
