use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const QUERY_REQUIRED: &str = "Query is required and must be a string";
pub const SEARCH_KEY_MISSING: &str = "SerpAPI key is not configured";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred while processing the search";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_time: Option<u64>,
}

/// Failures that end a request, each mapped to one error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("search provider failed: {message}")]
    Upstream {
        message: String,
        search_time_ms: Option<u64>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn query_required() -> Self {
        ApiError::Validation(QUERY_REQUIRED.to_string())
    }

    pub fn search_key_missing() -> Self {
        ApiError::Configuration(SEARCH_KEY_MISSING.to_string())
    }

    pub fn upstream(err: &anyhow::Error, search_time_ms: u64) -> Self {
        ApiError::Upstream {
            message: format!("Search failed: {}", err),
            search_time_ms: Some(search_time_ms),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(msg) => {
                warn!("Rejected search request: {}", msg);
                (status, Json(ErrorResponse { error: msg })).into_response()
            }
            ApiError::Configuration(msg) => {
                error!("Configuration error: {}", msg);
                (status, Json(ErrorResponse { error: msg })).into_response()
            }
            ApiError::Upstream {
                message,
                search_time_ms,
            } => {
                error!("Upstream search error: {}", message);
                (
                    status,
                    Json(UpstreamErrorResponse {
                        success: false,
                        error: message,
                        search_time: search_time_ms,
                    }),
                )
                    .into_response()
            }
            ApiError::Internal(msg) => {
                // The cause is only logged; clients get a generic message.
                error!("Internal error: {}", msg);
                (
                    status,
                    Json(UpstreamErrorResponse {
                        success: false,
                        error: INTERNAL_ERROR.to_string(),
                        search_time: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(ApiError::query_required().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::search_key_missing().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upstream = ApiError::upstream(&anyhow::anyhow!("timeout"), 12);
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_message_carries_cause() {
        match ApiError::upstream(&anyhow::anyhow!("HTTP 429"), 40) {
            ApiError::Upstream {
                message,
                search_time_ms,
            } => {
                assert!(message.contains("HTTP 429"));
                assert_eq!(search_time_ms, Some(40));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
