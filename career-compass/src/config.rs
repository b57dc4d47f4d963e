use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Startup configuration, read once from the process environment.
///
/// Provider credentials are optional here; whether a missing one is fatal
/// is decided per request by the orchestrator.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub search: SearchConfig,
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Number of organic results requested from the provider.
    pub result_count: u32,
    /// Upper bound on recommendations returned to the client.
    pub max_recommendations: usize,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            search: SearchConfig {
                api_key: None,
                base_url: DEFAULT_SERPAPI_URL.to_string(),
                result_count: 10,
                max_recommendations: 10,
            },
            ai: AiConfig {
                api_key: None,
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
            },
            cache: CacheConfig::default(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from the environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        // A missing .env is the normal case in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secret = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            bind_addr: text("BIND_ADDR", DEFAULT_BIND_ADDR),
            search: SearchConfig {
                api_key: secret("SERPAPI_API_KEY"),
                base_url: text("SERPAPI_URL", DEFAULT_SERPAPI_URL),
                result_count: parse_or(
                    &lookup,
                    "SEARCH_RESULT_COUNT",
                    defaults.search.result_count,
                )?,
                max_recommendations: parse_or(
                    &lookup,
                    "MAX_RECOMMENDATIONS",
                    defaults.search.max_recommendations,
                )?,
            },
            ai: AiConfig {
                api_key: secret("OPENAI_API_KEY"),
                base_url: text("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: text("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            cache: CacheConfig {
                max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
                ttl: Duration::from_secs(parse_or(
                    &lookup,
                    "CACHE_TTL_SECS",
                    defaults.cache.ttl.as_secs(),
                )?),
            },
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.search.api_key.is_none());
        assert!(config.ai.api_key.is_none());
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.search.max_recommendations, 10);
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERPAPI_API_KEY", "   "),
            ("OPENAI_API_KEY", ""),
        ]))
        .unwrap();
        assert!(config.search.api_key.is_none());
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERPAPI_API_KEY", "serp-key"),
            ("OPENAI_API_KEY", "ai-key"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("CACHE_MAX_ENTRIES", "5"),
            ("CACHE_TTL_SECS", "60"),
            ("MAX_RECOMMENDATIONS", "6"),
        ]))
        .unwrap();
        assert_eq!(config.search.api_key.as_deref(), Some("serp-key"));
        assert_eq!(config.ai.api_key.as_deref(), Some("ai-key"));
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.cache.max_entries, 5);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.search.max_recommendations, 6);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("CACHE_TTL_SECS", "an hour")])).unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL_SECS"));
    }
}
