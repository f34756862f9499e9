//! Job persistence over the KV port.
//!
//! One key per job under the `job:` namespace, TTL-bounded. Writes are
//! last-writer-wins; that is sound here because every job transition is
//! monotone (stage only advances, status only becomes terminal).

use std::sync::Arc;

use vsum_models::{Job, JobId};

use crate::error::StoreResult;
use crate::kv::KvStore;

const JOB_PREFIX: &str = "job:";

/// Repository for job records.
#[derive(Clone)]
pub struct JobRepo {
    store: Arc<dyn KvStore>,
    ttl_seconds: u64,
}

impl JobRepo {
    pub fn new(store: Arc<dyn KvStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    fn key(id: &JobId) -> String {
        format!("{}{}", JOB_PREFIX, id)
    }

    /// Persist the job, refreshing its TTL.
    pub async fn save(&self, job: &Job) -> StoreResult<()> {
        let payload = serde_json::to_string(job)?;
        self.store
            .put(&Self::key(&job.id), &payload, self.ttl_seconds)
            .await
    }

    /// Load a job; `None` when the key is absent or expired.
    pub async fn load(&self, id: &JobId) -> StoreResult<Option<Job>> {
        match self.store.get(&Self::key(id)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Live job ids, admin-only.
    pub async fn live_ids(&self) -> StoreResult<Vec<String>> {
        let keys = self.store.keys_with_prefix(JOB_PREFIX).await?;
        Ok(keys
            .into_iter()
            .map(|k| k.trim_start_matches(JOB_PREFIX).to_string())
            .collect())
    }
}
