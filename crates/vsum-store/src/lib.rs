//! Storage layer: a uniform TTL key/value port with a Redis backend for
//! deployment and an in-memory backend for development and tests, plus the
//! job repository, the result cache and the sliding-window rate limiter
//! built on top of it.

pub mod cache;
pub mod error;
pub mod jobs;
pub mod kv;
pub mod memory;
pub mod rate_limit;
pub mod redis_store;

pub use cache::{fingerprint, CacheEntry, SummaryCache};
pub use error::{StoreError, StoreResult};
pub use jobs::JobRepo;
pub use kv::KvStore;
pub use memory::MemoryStore;
pub use rate_limit::{MethodClass, RateDecision, RateLimitSettings, RateLimiter};
pub use redis_store::RedisStore;
