use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::config::CacheConfig;
use crate::types::SearchResponse;

/// Normalized cache key for a query: trimmed and lower-cased.
pub fn cache_key(query: &str) -> String {
    query.trim().to_lowercase()
}

/// What a cache hit replays: the response plus any warning it was served with.
#[derive(Debug, Clone)]
pub struct CachedSearch {
    pub response: SearchResponse,
    pub warnings: Option<String>,
}

/// Bounded, expiring, process-local store of orchestration results.
///
/// Capacity overflow evicts the least-recently-used entry; entries older
/// than the TTL read as misses. Nothing here can fail.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, CachedSearch>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.ttl)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<CachedSearch> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: CachedSearch) {
        self.inner.insert(key, value).await;
    }

    /// Flush moka's deferred maintenance (eviction, expiry bookkeeping).
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::time::Duration;

    fn sample(query: &str) -> CachedSearch {
        CachedSearch {
            response: SearchResponse {
                recommended_websites: Vec::new(),
                market_insights: crate::insights::fallback_market_insights(),
                career_insights: CareerInsights::default(),
                search_metadata: SearchMetadata {
                    total_results: 0,
                    search_time: 1,
                    cache_hit: false,
                    api_version: format!("{}-{}", API_VERSION, query),
                },
                status: SearchStatus::complete(),
            },
            warnings: None,
        }
    }

    fn small_cache(max_entries: u64, ttl: Duration) -> ResponseCache {
        ResponseCache::new(&CacheConfig { max_entries, ttl })
    }

    #[test]
    fn test_cache_key_normalizes_case_and_whitespace() {
        assert_eq!(cache_key(" Software Engineer "), cache_key("software engineer"));
        assert_eq!(cache_key("\tData  Scientist\n"), "data  scientist");
    }

    #[tokio::test]
    async fn test_get_returns_inserted_value() {
        let cache = small_cache(10, Duration::from_secs(60));
        cache.insert("rust".into(), sample("rust")).await;
        let hit = cache.get("rust").await.expect("entry should be cached");
        assert_eq!(hit.response.search_metadata.api_version, "2.0-rust");
        assert!(cache.get("go").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = small_cache(10, Duration::from_millis(100));
        cache.insert("nurse".into(), sample("nurse")).await;
        assert!(cache.get("nurse").await.is_some());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(cache.get("nurse").await.is_none());
    }

    #[tokio::test]
    async fn test_overflow_evicts_least_recently_used() {
        let cache = small_cache(3, Duration::from_secs(60));
        for key in ["a", "b", "c"] {
            cache.insert(key.to_string(), sample(key)).await;
            cache.run_pending_tasks().await;
        }

        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a").await.is_some());
        cache.run_pending_tasks().await;

        cache.insert("d".to_string(), sample("d")).await;
        cache.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), 3);
        assert!(cache.get("b").await.is_none());
        assert!(cache.get("a").await.is_some());
        assert!(cache.get("c").await.is_some());
        assert!(cache.get("d").await.is_some());
    }
}
