use anyhow::Result;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::classify;
use crate::providers::{SearchParams, SearchProvider};
use crate::types::*;

/// Appended to every query so the provider leans towards learning material.
pub const QUERY_SUFFIX: &str = "career guide resources learning";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub result_count: u32,
    pub max_recommendations: usize,
}

/// Recommendations plus the metadata describing how they were obtained.
#[derive(Debug, Clone)]
pub struct FetchedResults {
    pub recommendations: Vec<WebsiteRecommendation>,
    pub metadata: SearchMetadata,
}

/// Query the search provider and shape its organic results into recommendations.
///
/// Provider failures are returned as-is; nothing is fabricated on error.
pub async fn fetch_recommendations(
    provider: &dyn SearchProvider,
    query: &str,
    filters: Option<&SearchFilters>,
    options: &FetchOptions,
) -> Result<FetchedResults> {
    let started = Instant::now();
    let params = SearchParams {
        query: format!("{} {}", query, QUERY_SUFFIX),
        num: options.result_count,
        location: filters
            .and_then(|f| f.location.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    };
    if let Some(f) = filters {
        debug!(
            "Search filters: location={:?} job_type={:?} experience_level={:?}",
            f.location, f.job_type, f.experience_level
        );
    }

    let organic = provider.organic_results(&params).await?;
    let recommendations = shape_results(organic, options.max_recommendations);
    info!("Shaped {} website recommendations", recommendations.len());

    Ok(FetchedResults {
        metadata: SearchMetadata {
            total_results: recommendations.len(),
            search_time: started.elapsed().as_millis() as u64,
            cache_hit: false,
            api_version: API_VERSION.to_string(),
        },
        recommendations,
    })
}

/// Turn raw organic results into sorted, capped recommendations.
///
/// Relevance uses the result's rank in the provider response, so job
/// listings dropped here still consume a rank.
pub fn shape_results(organic: Vec<OrganicResult>, cap: usize) -> Vec<WebsiteRecommendation> {
    let mut seen = HashSet::new();
    let mut recommendations: Vec<WebsiteRecommendation> = organic
        .into_iter()
        .enumerate()
        .filter(|(_, result)| !result.link.trim().is_empty())
        .filter(|(_, result)| !classify::is_job_listing(&result.link))
        .filter(|(_, result)| seen.insert(result.link.clone()))
        .map(|(position, result)| to_recommendation(position, result))
        .collect();

    // Stable sort keeps provider order among equal (floored) scores.
    recommendations.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    recommendations.truncate(cap);
    recommendations
}

fn to_recommendation(position: usize, result: OrganicResult) -> WebsiteRecommendation {
    let access_type = classify::access_type_for(&result.link);
    WebsiteRecommendation {
        category: classify::category_for(&result.link),
        relevance_score: classify::relevance_score(position),
        trust_score: classify::trust_score_for(&result.link),
        features: classify::features_for(&result.snippet),
        is_premium: access_type == AccessType::Premium,
        access_type,
        title: result.title,
        url: result.link,
        description: result.snippet,
    }
}
