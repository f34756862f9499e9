//! Sliding-window rate limiter.
//!
//! Counters live in the KV store so every instance sees the same window.
//! Each key holds the timestamps of recent requests for one
//! `(method class, client identity)` pair; a check prunes the window and
//! admits the request if capacity remains. When the feature is disabled or
//! no remote KV is configured, every check passes and reports the full
//! configured limit as remaining.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::error::StoreResult;
use crate::kv::KvStore;

const RL_PREFIX: &str = "rl:";
const WINDOW_MS: i64 = 60_000;

/// Which endpoint class a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Post,
    Get,
}

impl MethodClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodClass::Post => "post",
            MethodClass::Get => "get",
        }
    }
}

/// Limiter configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub post_rpm: u32,
    pub get_rpm: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            post_rpm: 10,
            get_rpm: 60,
        }
    }
}

impl RateLimitSettings {
    fn limit_for(&self, class: MethodClass) -> u32 {
        match class {
            MethodClass::Post => self.post_rpm,
            MethodClass::Get => self.get_rpm,
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// When the window frees a slot, milliseconds since epoch.
    pub reset_at_ms: i64,
}

impl RateDecision {
    /// Seconds until a retry can succeed, at least 1.
    pub fn retry_after_seconds(&self) -> i64 {
        ((self.reset_at_ms - Utc::now().timestamp_millis()) / 1000).max(1)
    }
}

/// Sliding-window limiter over the KV port.
#[derive(Clone)]
pub struct RateLimiter {
    store: Option<Arc<dyn KvStore>>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    /// Active limiter backed by `store`.
    pub fn new(store: Arc<dyn KvStore>, settings: RateLimitSettings) -> Self {
        let store = settings.enabled.then_some(store);
        Self { store, settings }
    }

    /// Limiter that admits everything (feature disabled or no KV).
    pub fn disabled(settings: RateLimitSettings) -> Self {
        Self {
            store: None,
            settings,
        }
    }

    /// Check and consume one slot for `(class, identity)`.
    ///
    /// Store errors fail open: an unreachable KV should degrade service
    /// gracefully, not reject every caller.
    pub async fn check(&self, class: MethodClass, identity: &str) -> RateDecision {
        let limit = self.settings.limit_for(class);
        let now_ms = Utc::now().timestamp_millis();

        let Some(store) = &self.store else {
            return RateDecision {
                allowed: true,
                limit,
                remaining: limit,
                reset_at_ms: now_ms + WINDOW_MS,
            };
        };

        match self.check_window(store.as_ref(), class, identity, limit, now_ms).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, class = class.as_str(), "Rate limit check failed; allowing");
                RateDecision {
                    allowed: true,
                    limit,
                    remaining: limit,
                    reset_at_ms: now_ms + WINDOW_MS,
                }
            }
        }
    }

    async fn check_window(
        &self,
        store: &dyn KvStore,
        class: MethodClass,
        identity: &str,
        limit: u32,
        now_ms: i64,
    ) -> StoreResult<RateDecision> {
        let key = format!("{}{}:{}", RL_PREFIX, class.as_str(), identity);

        let mut window: Vec<i64> = match store.get(&key).await? {
            Some(payload) => serde_json::from_str(&payload).unwrap_or_default(),
            None => Vec::new(),
        };
        window.retain(|&ts| ts > now_ms - WINDOW_MS);

        let reset_at_ms = window.first().map_or(now_ms + WINDOW_MS, |&oldest| oldest + WINDOW_MS);

        if window.len() >= limit as usize {
            return Ok(RateDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at_ms,
            });
        }

        window.push(now_ms);
        let remaining = limit - window.len() as u32;
        let payload = serde_json::to_string(&window)?;
        store.put(&key, &payload, (WINDOW_MS / 1000) as u64).await?;

        Ok(RateDecision {
            allowed: true,
            limit,
            remaining,
            reset_at_ms,
        })
    }
}
