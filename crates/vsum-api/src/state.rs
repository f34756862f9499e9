//! Application state.

use std::sync::Arc;

use vsum_models::UrlPolicy;
use vsum_providers::{
    GeminiClient, SummaryEngine, Summarizer, SupadataClient, TranscriptProvider,
};
use vsum_store::{
    JobRepo, KvStore, MemoryStore, RateLimiter, RedisStore, StoreResult, SummaryCache,
};

use crate::config::AppConfig;

/// Shared application state. The store backend and providers are chosen
/// once at startup; configuration is immutable thereafter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jobs: JobRepo,
    pub cache: SummaryCache,
    pub limiter: RateLimiter,
    pub transcripts: Arc<dyn TranscriptProvider>,
    pub summarizer: Arc<dyn Summarizer>,
    pub engine: SummaryEngine,
    pub url_policy: Arc<UrlPolicy>,
}

impl AppState {
    /// Assemble state from explicit parts. Tests inject mock providers and
    /// an in-memory store through this constructor.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn KvStore>,
        transcripts: Arc<dyn TranscriptProvider>,
        summarizer: Arc<dyn Summarizer>,
        limiter: RateLimiter,
    ) -> Self {
        let url_policy = Arc::new(config.url_policy());
        let engine = SummaryEngine::new(config.chunking, config.budgets, config.key_points);
        Self {
            jobs: JobRepo::new(store.clone(), config.ttl.job_seconds),
            cache: SummaryCache::new(store, config.ttl.cache_seconds),
            limiter,
            transcripts,
            summarizer,
            engine,
            url_policy,
            config: Arc::new(config),
        }
    }

    /// Production wiring: Redis when `KV_URL` is set, in-memory otherwise;
    /// the rate limiter is live only with a remote KV behind it.
    pub async fn from_config(config: AppConfig) -> StoreResult<Self> {
        let store: Arc<dyn KvStore> = match &config.kv_url {
            Some(url) => Arc::new(RedisStore::connect(url).await?),
            None => Arc::new(MemoryStore::new()),
        };

        let limiter = if config.kv_url.is_some() {
            RateLimiter::new(store.clone(), config.rate_limit)
        } else {
            RateLimiter::disabled(config.rate_limit)
        };

        let transcripts: Arc<dyn TranscriptProvider> = Arc::new(SupadataClient::new(
            config.providers.supadata_api_key.clone().unwrap_or_default(),
            config.providers.supadata_base_url.clone(),
        ));
        let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiClient::new(
            config.providers.gemini_api_key.clone().unwrap_or_default(),
            config.providers.gemini_model.clone(),
            config.providers.gemini_base_url.clone(),
            config.budgets,
        ));

        Ok(Self::new(config, store, transcripts, summarizer, limiter))
    }
}
