pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod mock;
pub mod orchestrator;
pub mod providers;
pub mod search;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::providers::{CompletionProvider, OpenAiClient, SearchProvider, SerpApiClient};
use crate::search::FetchOptions;

pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Wire real providers from configuration. A provider whose credential is
    /// absent is left out; the orchestrator decides what that means.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("career-compass/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let search: Option<Arc<dyn SearchProvider>> = match &config.search.api_key {
            Some(key) => Some(Arc::new(SerpApiClient::new(
                http_client.clone(),
                config.search.base_url.clone(),
                key.clone(),
            ))),
            None => {
                warn!("SERPAPI_API_KEY is not set; search requests will fail");
                None
            }
        };
        let completion: Option<Arc<dyn CompletionProvider>> = match &config.ai.api_key {
            Some(key) => {
                info!("AI insights enabled with model {}", config.ai.model);
                Some(Arc::new(OpenAiClient::new(
                    http_client,
                    config.ai.base_url.clone(),
                    key.clone(),
                    config.ai.model.clone(),
                )))
            }
            None => {
                warn!("OPENAI_API_KEY is not set; AI insights run in degraded mode");
                None
            }
        };

        Ok(Self::with_providers(config, search, completion))
    }

    /// Build state around explicit providers, e.g. the in-memory ones in [`mock`].
    pub fn with_providers(
        config: &Config,
        search: Option<Arc<dyn SearchProvider>>,
        completion: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        let orchestrator = Orchestrator::new(
            search,
            completion,
            ResponseCache::new(&config.cache),
            FetchOptions {
                result_count: config.search.result_count,
                max_recommendations: config.search.max_recommendations,
            },
        );
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        .route("/api/search", post(handlers::search_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(handlers::handle_panic)),
        )
        .with_state(Arc::new(state))
}
