use futures::future::join3;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::{cache_key, CachedSearch, ResponseCache};
use crate::error::ApiError;
use crate::insights::{self, InsightError};
use crate::providers::{CompletionProvider, SearchProvider};
use crate::search::{self, FetchOptions};
use crate::types::*;

pub const AI_KEY_MISSING_WARNING: &str =
    "OpenAI API key is not configured; AI insights are unavailable and default values are shown.";
pub const CAREER_FALLBACK_WARNING: &str =
    "Career insights could not be generated; default values are shown.";
pub const MARKET_FALLBACK_WARNING: &str =
    "Market insights could not be generated; default values are shown.";

/// Result of one search request, ready to be wrapped in the success envelope.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub response: SearchResponse,
    pub warnings: Option<String>,
    pub cached: bool,
}

/// Check the raw `query` field and return it trimmed.
pub fn validate_query(query: &Value) -> Result<String, ApiError> {
    match query.as_str().map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(ApiError::query_required()),
    }
}

/// Cache check, concurrent fan-out to search and AI providers, and merge.
///
/// A provider slot is `None` when its credential was not configured at
/// startup. Search is mandatory; AI insights degrade to fallbacks.
pub struct Orchestrator {
    search: Option<Arc<dyn SearchProvider>>,
    completion: Option<Arc<dyn CompletionProvider>>,
    cache: ResponseCache,
    fetch_options: FetchOptions,
}

impl Orchestrator {
    pub fn new(
        search: Option<Arc<dyn SearchProvider>>,
        completion: Option<Arc<dyn CompletionProvider>>,
        cache: ResponseCache,
        fetch_options: FetchOptions,
    ) -> Self {
        Self {
            search,
            completion,
            cache,
            fetch_options,
        }
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, ApiError> {
        let query = validate_query(&request.query)?;
        let key = cache_key(&query);

        if let Some(hit) = self.cache.get(&key).await {
            info!("Cache hit for {:?}", key);
            let mut response = hit.response;
            response.search_metadata.cache_hit = true;
            return Ok(SearchOutcome {
                response,
                warnings: hit.warnings,
                cached: true,
            });
        }
        debug!("Cache miss for {:?}", key);

        let search_provider = self.search.as_ref().ok_or_else(ApiError::search_key_missing)?;
        let mut warnings = Vec::new();
        if self.completion.is_none() {
            warn!("Completion provider not configured; serving fallback insights");
            warnings.push(AI_KEY_MISSING_WARNING);
        }

        let started = Instant::now();
        let profile = request.user_profile.as_ref();
        let fetch = search::fetch_recommendations(
            search_provider.as_ref(),
            &query,
            request.filters.as_ref(),
            &self.fetch_options,
        );
        let career = async {
            match &self.completion {
                Some(provider) => Some(
                    insights::generate_career_insights(provider.as_ref(), &query, profile).await,
                ),
                None => None,
            }
        };
        let market = async {
            match &self.completion {
                Some(provider) => {
                    Some(insights::generate_market_insights(provider.as_ref(), &query).await)
                }
                None => None,
            }
        };

        // All three settle before anything is decided.
        let (fetched, career, market) = join3(fetch, career, market).await;

        let fetched = fetched.map_err(|e| {
            let elapsed = started.elapsed().as_millis() as u64;
            error!("Search provider failed after {}ms: {}", elapsed, e);
            ApiError::upstream(&e, elapsed)
        })?;

        let career_insights = settle(career, "career", &mut warnings, CAREER_FALLBACK_WARNING)
            .unwrap_or_else(insights::fallback_career_insights);
        let market_insights = settle(market, "market", &mut warnings, MARKET_FALLBACK_WARNING)
            .unwrap_or_else(insights::fallback_market_insights);

        let response = SearchResponse {
            recommended_websites: fetched.recommendations,
            market_insights,
            career_insights,
            search_metadata: fetched.metadata,
            status: SearchStatus::complete(),
        };
        let warnings = if warnings.is_empty() {
            None
        } else {
            Some(warnings.join(" "))
        };

        self.cache
            .insert(
                key,
                CachedSearch {
                    response: response.clone(),
                    warnings: warnings.clone(),
                },
            )
            .await;
        info!(
            "Search completed with {} recommendations in {}ms",
            response.recommended_websites.len(),
            started.elapsed().as_millis()
        );

        Ok(SearchOutcome {
            response,
            warnings,
            cached: false,
        })
    }
}

/// Unwrap one generator outcome, recording a warning when it fell back.
fn settle<T>(
    outcome: Option<Result<T, InsightError>>,
    label: &str,
    warnings: &mut Vec<&'static str>,
    warning: &'static str,
) -> Option<T> {
    match outcome {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            warn!("Falling back to default {} insights: {}", label, e);
            warnings.push(warning);
            None
        }
        None => None,
    }
}
