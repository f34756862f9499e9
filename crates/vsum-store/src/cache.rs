//! Result cache keyed on a request fingerprint.
//!
//! Only completed summaries are ever stored, so a hit can be served as a
//! synthetic completed projection without consulting the job keyspace.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use vsum_models::{LangPref, SummaryMeta, SummaryOptions, SummaryResult};

use crate::error::StoreResult;
use crate::kv::KvStore;

const CACHE_PREFIX: &str = "cache:";

/// Cached outcome of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub result: SummaryResult,
    pub meta: SummaryMeta,
    pub created_at: DateTime<Utc>,
}

/// Deterministic fingerprint of `(normalized url, canonical options)`.
///
/// The options render orders keys and spells defaults out, so option sets
/// that are equal as sets always collide onto the same key.
pub fn fingerprint(normalized_url: &str, lang: LangPref, options: &SummaryOptions) -> String {
    let material = format!("{}:{}", normalized_url, options.canonical_string(lang));
    let digest = Sha256::digest(material.as_bytes());
    format!("{:x}", digest)
}

/// TTL-bounded summary cache over the KV port.
#[derive(Clone)]
pub struct SummaryCache {
    store: Arc<dyn KvStore>,
    ttl_seconds: u64,
}

impl SummaryCache {
    pub fn new(store: Arc<dyn KvStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    fn key(url: &str, lang: LangPref, options: &SummaryOptions) -> String {
        format!("{}{}", CACHE_PREFIX, fingerprint(url, lang, options))
    }

    /// Look up a prior completed summary for this request shape.
    pub async fn lookup(
        &self,
        url: &str,
        lang: LangPref,
        options: &SummaryOptions,
    ) -> StoreResult<Option<CacheEntry>> {
        let key = Self::key(url, lang, options);
        match self.store.get(&key).await? {
            Some(payload) => match serde_json::from_str(&payload) {
                Ok(entry) => Ok(Some(entry)),
                Err(e) => {
                    // Corrupt entries are treated as misses.
                    debug!(key = %key, error = %e, "Dropping undecodable cache entry");
                    self.store.delete(&key).await?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Record a completed result.
    pub async fn store(
        &self,
        url: &str,
        lang: LangPref,
        options: &SummaryOptions,
        result: SummaryResult,
        meta: SummaryMeta,
    ) -> StoreResult<()> {
        let entry = CacheEntry {
            result,
            meta,
            created_at: Utc::now(),
        };
        let payload = serde_json::to_string(&entry)?;
        self.store
            .put(&Self::key(url, lang, options), &payload, self.ttl_seconds)
            .await
    }

    /// Drop any cached summary for this request shape.
    pub async fn invalidate(
        &self,
        url: &str,
        lang: LangPref,
        options: &SummaryOptions,
    ) -> StoreResult<()> {
        self.store.delete(&Self::key(url, lang, options)).await
    }
}
