//! Outbound provider clients.
//!
//! The orchestrator only sees the [`SearchProvider`] and [`CompletionProvider`]
//! traits; the HTTP implementations below talk to SerpAPI and to an
//! OpenAI-compatible chat-completions endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::*;

/// Attempts the completion client makes before giving up.
pub const COMPLETION_MAX_ATTEMPTS: usize = 3;

/// Parameters for one organic web search.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub num: u32,
    pub location: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Organic results in provider rank order.
    async fn organic_results(&self, params: &SearchParams) -> Result<Vec<OrganicResult>>;
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Free text produced for a system/user message pair.
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}

fn search_backoff() -> backoff::ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(200))
        .with_max_interval(Duration::from_secs(2))
        .with_max_elapsed_time(Some(Duration::from_secs(4)))
        .build()
}

fn completion_backoff() -> backoff::ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(500))
        .with_max_interval(Duration::from_secs(4))
        .with_max_elapsed_time(Some(Duration::from_secs(60)))
        .build()
}

/// 5xx and network faults are worth another attempt; other statuses are not.
fn classify_status(
    status: reqwest::StatusCode,
    err: anyhow::Error,
) -> backoff::Error<anyhow::Error> {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

pub struct SerpApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn organic_results(&self, params: &SearchParams) -> Result<Vec<OrganicResult>> {
        let url = format!("{}/search.json", self.base_url);
        let num = params.num.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("engine", "google"),
            ("q", params.query.as_str()),
            ("hl", "en"),
            ("gl", "us"),
            ("num", num.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(location) = params.location.as_deref() {
            query.push(("location", location));
        }
        debug!("SerpAPI request: {} q={}", url, params.query);

        let response: SerpApiResponse = retry(search_backoff(), || async {
            let resp = self
                .http
                .get(&url)
                .query(&query)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(anyhow!(
                        "Failed to send request to SerpAPI: {}",
                        e.without_url()
                    ))
                })?;
            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(classify_status(
                    status,
                    anyhow!("SerpAPI request failed with status {}: {}", status, text),
                ));
            }
            resp.json::<SerpApiResponse>().await.map_err(|e| {
                backoff::Error::transient(anyhow!(
                    "Failed to parse SerpAPI response: {}",
                    e.without_url()
                ))
            })
        })
        .await?;

        if let Some(message) = response.error {
            // SerpAPI reports "no results" as an error string on a 200.
            let no_results = message.contains("hasn't returned any results");
            if response.organic_results.is_empty() && !no_results {
                return Err(anyhow!("SerpAPI error: {}", message));
            }
        }

        info!("SerpAPI returned {} organic results", response.organic_results.len());
        Ok(response.organic_results)
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
        };

        let this = self;
        let url = url.as_str();
        let request = &request;
        let mut attempt = 0usize;
        let completion: ChatCompletionResponse = retry(completion_backoff(), move || {
            attempt += 1;
            let attempt = attempt;
            async move {
                let give_up = attempt >= COMPLETION_MAX_ATTEMPTS;
                let fail = |err: backoff::Error<anyhow::Error>| match err {
                    backoff::Error::Transient { err, .. } if give_up => {
                        backoff::Error::permanent(err)
                    }
                    other => other,
                };

                let resp = this
                    .http
                    .post(url)
                    .bearer_auth(&this.api_key)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| {
                        let e = e.without_url();
                        warn!("Completion attempt {} failed to send: {}", attempt, e);
                        fail(backoff::Error::transient(anyhow!(
                            "Failed to reach completion provider: {}",
                            e
                        )))
                    })?;
                let status = resp.status();
                if !status.is_success() {
                    let text = resp.text().await.unwrap_or_default();
                    warn!("Completion attempt {} returned {}", attempt, status);
                    return Err(fail(classify_status(
                        status,
                        anyhow!("Completion request failed with status {}: {}", status, text),
                    )));
                }
                resp.json::<ChatCompletionResponse>().await.map_err(|e| {
                    fail(backoff::Error::transient(anyhow!(
                        "Failed to parse completion response: {}",
                        e.without_url()
                    )))
                })
            }
        })
        .await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(anyhow!("Model '{}' returned empty content", self.model));
        }
        Ok(content)
    }
}
