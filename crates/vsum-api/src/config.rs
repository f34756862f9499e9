//! Service configuration.

use vsum_models::{ChunkLimits, KeyPointBounds, LengthBudget, SummaryBudgets, UrlPolicy};
use vsum_store::RateLimitSettings;

/// TTLs for the two keyspaces, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct TtlConfig {
    pub job_seconds: u64,
    pub cache_seconds: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            job_seconds: 7_200,       // 2h
            cache_seconds: 604_800,   // 7d
        }
    }
}

/// External provider credentials and knobs.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub supadata_api_key: Option<String>,
    pub supadata_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
}

impl ProviderConfig {
    /// Both credentials must be present before any request can be served.
    pub fn ensure_complete(&self) -> Result<(), String> {
        if self.supadata_api_key.as_deref().unwrap_or("").is_empty() {
            return Err("SUPADATA_API_KEY is not set".to_string());
        }
        if self.gemini_api_key.as_deref().unwrap_or("").is_empty() {
            return Err("GEMINI_API_KEY is not set".to_string());
        }
        Ok(())
    }
}

/// Complete service configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub providers: ProviderConfig,
    /// Remote KV connection URL; absent means the in-memory backend.
    pub kv_url: Option<String>,
    pub rate_limit: RateLimitSettings,
    pub ttl: TtlConfig,
    pub chunking: ChunkLimits,
    pub budgets: SummaryBudgets,
    pub key_points: KeyPointBounds,
    /// Empty means the built-in YouTube allowlist.
    pub allowed_hosts: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            providers: ProviderConfig {
                gemini_model: "gemini-2.5-flash".to_string(),
                ..ProviderConfig::default()
            },
            kv_url: None,
            rate_limit: RateLimitSettings::default(),
            ttl: TtlConfig::default(),
            chunking: ChunkLimits::default(),
            budgets: SummaryBudgets::default(),
            key_points: KeyPointBounds::default(),
            allowed_hosts: Vec::new(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_budgets = SummaryBudgets::default();
        let default_chunking = ChunkLimits::default();

        Self {
            host: env_string("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port),
            cors_origins: env_string("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            providers: ProviderConfig {
                supadata_api_key: env_string("SUPADATA_API_KEY"),
                supadata_base_url: env_string("SUPADATA_BASE_URL"),
                gemini_api_key: env_string("GEMINI_API_KEY"),
                gemini_model: env_string("GEMINI_MODEL")
                    .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
                gemini_base_url: env_string("GEMINI_BASE_URL"),
            },
            kv_url: env_string("KV_URL"),
            rate_limit: RateLimitSettings {
                enabled: env_bool("RATE_LIMIT_ENABLED", true),
                post_rpm: env_parse("RATE_LIMIT_POST_RPM", 10),
                get_rpm: env_parse("RATE_LIMIT_GET_RPM", 60),
            },
            ttl: TtlConfig {
                job_seconds: env_parse("JOB_TTL_SECS", 7_200),
                cache_seconds: env_parse("CACHE_TTL_SECS", 604_800),
            },
            chunking: ChunkLimits {
                transcript_max_chars: env_parse(
                    "TRANSCRIPT_MAX_CHARS",
                    default_chunking.transcript_max_chars,
                ),
                chunk_min_chars: env_parse("CHUNK_MIN_CHARS", default_chunking.chunk_min_chars),
                chunk_max_chars: env_parse("CHUNK_MAX_CHARS", default_chunking.chunk_max_chars),
            },
            budgets: SummaryBudgets {
                short: LengthBudget {
                    min_chars: env_parse("SUMMARY_SHORT_MIN", default_budgets.short.min_chars),
                    max_chars: env_parse("SUMMARY_SHORT_MAX", default_budgets.short.max_chars),
                },
                standard: LengthBudget {
                    min_chars: env_parse("SUMMARY_STANDARD_MIN", default_budgets.standard.min_chars),
                    max_chars: env_parse("SUMMARY_STANDARD_MAX", default_budgets.standard.max_chars),
                },
                detailed: LengthBudget {
                    min_chars: env_parse("SUMMARY_DETAILED_MIN", default_budgets.detailed.min_chars),
                    max_chars: env_parse("SUMMARY_DETAILED_MAX", default_budgets.detailed.max_chars),
                },
            },
            key_points: KeyPointBounds {
                min: env_parse("KEY_POINTS_MIN", 5),
                max: env_parse("KEY_POINTS_MAX", 9),
            },
            allowed_hosts: env_string("ALLOWED_HOSTS")
                .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
                .unwrap_or_default(),
        }
    }

    /// URL policy derived from the allowlist override.
    pub fn url_policy(&self) -> UrlPolicy {
        if self.allowed_hosts.is_empty() {
            UrlPolicy::default()
        } else {
            UrlPolicy::with_hosts(self.allowed_hosts.iter().cloned())
        }
    }
}
