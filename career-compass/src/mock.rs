//! In-memory providers for tests and local runs without credentials.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::providers::{CompletionProvider, SearchParams, SearchProvider};
use crate::types::OrganicResult;

pub const SAMPLE_CAREER_JSON: &str = r#"{
  "practicalGuides": [
    "Lead a small feature end to end in your current team",
    "Write a one-page product spec for a problem you know well",
    "Learn basic SQL to answer your own product questions",
    "Interview five users and summarise what you heard",
    "Ask a product manager to review your roadmap draft"
  ],
  "theoreticalInsight": "Domain knowledge carries over when it is reframed as product judgement.",
  "contradictoryTake": "A formal title change matters less than visible ownership of outcomes.",
  "relatedSearches": ["associate product manager programs", "product sense interview"]
}"#;

pub const SAMPLE_MARKET_JSON: &str = r#"{
  "demandTrend": "rising",
  "growthOutlook": "steady growth",
  "salary": {"currency": "USD", "entryLevel": 90000, "median": 125000, "seniorLevel": 170000},
  "topCompanies": ["Google", "Microsoft", "Shopify"],
  "requiredSkills": ["Prioritisation", "Data analysis", "Communication"],
  "locations": [{"location": "Seattle", "demand": "high", "averageSalary": 140000}],
  "industries": [{"industry": "Software", "sharePercent": 58}]
}"#;

/// A fixed page of organic results spread over a few well-known domains.
pub fn sample_organic_results() -> Vec<OrganicResult> {
    [
        (
            "https://www.coursera.org/learn/uva-darden-digital-product-management",
            "A course on digital product management.",
        ),
        (
            "https://github.com/productmanagers/awesome-product-management",
            "A curated guide of PM resources.",
        ),
        (
            "https://www.linkedin.com/jobs/view/3791234567",
            "Product Manager job in Austin.",
        ),
        (
            "https://www.reddit.com/r/ProductManagement/",
            "Community discussion for product managers.",
        ),
        (
            "https://roadmap.sh/product-manager",
            "Step by step guide to becoming a product manager.",
        ),
        (
            "https://medium.com/@pm/how-i-moved-into-product-7a1b",
            "An article about moving into product.",
        ),
    ]
    .iter()
    .enumerate()
    .map(|(i, (link, snippet))| OrganicResult {
        title: format!("Result {}", i + 1),
        link: link.to_string(),
        snippet: snippet.to_string(),
    })
    .collect()
}

pub struct MockSearchProvider {
    results: Vec<OrganicResult>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockSearchProvider {
    pub fn new(results: Vec<OrganicResult>) -> Self {
        Self {
            results,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let provider = Self::new(Vec::new());
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn organic_results(&self, _params: &SearchParams) -> Result<Vec<OrganicResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("SerpAPI request failed with status 503 Service Unavailable"));
        }
        Ok(self.results.clone())
    }
}

/// Answers market prompts with `market_reply` and everything else with `career_reply`.
pub struct MockCompletionProvider {
    career_reply: String,
    market_reply: String,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockCompletionProvider {
    pub fn new(career_reply: impl Into<String>, market_reply: impl Into<String>) -> Self {
        Self {
            career_reply: career_reply.into(),
            market_reply: market_reply.into(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn healthy() -> Self {
        Self::new(SAMPLE_CAREER_JSON, SAMPLE_MARKET_JSON)
    }

    pub fn unreachable() -> Self {
        let provider = Self::healthy();
        provider.failing.store(true, Ordering::SeqCst);
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, system: &str, _user: &str, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("Failed to reach completion provider: connection refused"));
        }
        if system.contains("demandTrend") {
            Ok(self.market_reply.clone())
        } else {
            Ok(self.career_reply.clone())
        }
    }
}
