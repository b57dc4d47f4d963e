use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use crate::error::ApiError;
use crate::types::*;
use crate::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `POST /api/search`.
///
/// Body-level JSON errors are reported as the same validation error as a
/// bad `query`, so clients see one 400 shape.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        info!("Unreadable search body: {}", rejection.body_text());
        ApiError::query_required()
    })?;
    let span = tracing::info_span!("search", request_id = %uuid::Uuid::new_v4());
    // Only `query` is mandatory; malformed optional sections are logged and dropped.
    let (request, _) = span.in_scope(|| parse_request(body));

    let outcome = state.orchestrator.search(request).instrument(span).await?;

    Ok(Json(SearchEnvelope {
        success: true,
        data: outcome.response,
        warnings: outcome.warnings,
        cached: outcome.cached,
    }))
}

/// Split the body into a request, returning the names of optional sections
/// that were present but could not be read.
fn parse_request(mut body: serde_json::Value) -> (SearchRequest, Vec<&'static str>) {
    let mut ignored = Vec::new();
    let Some(object) = body.as_object_mut() else {
        return (SearchRequest::default(), ignored);
    };
    let query = object.remove("query").unwrap_or_default();
    let filters = optional_section(object, "filters", &mut ignored);
    let user_profile = optional_section(object, "userProfile", &mut ignored);
    let request = SearchRequest {
        query,
        filters,
        user_profile,
    };
    (request, ignored)
}

fn optional_section<T: DeserializeOwned>(
    object: &mut serde_json::Map<String, serde_json::Value>,
    name: &'static str,
    ignored: &mut Vec<&'static str>,
) -> Option<T> {
    let value = object.remove(name).filter(|v| !v.is_null())?;
    match serde_json::from_value(value) {
        Ok(section) => Some(section),
        Err(e) => {
            warn!("Ignoring malformed `{}` in search request: {}", name, e);
            ignored.push(name);
            None
        }
    }
}

/// Turn a handler panic into the generic 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("request handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_keeps_valid_sections() {
        let (request, ignored) = parse_request(json!({
            "query": "nurse",
            "filters": {"location": "Leeds", "jobType": "full-time"},
            "userProfile": {"skills": ["triage"], "currentRole": "HCA"}
        }));
        assert!(ignored.is_empty());
        assert_eq!(request.query, json!("nurse"));
        assert_eq!(request.filters.unwrap().job_type.as_deref(), Some("full-time"));
        assert_eq!(request.user_profile.unwrap().current_role.as_deref(), Some("HCA"));
    }

    #[test]
    fn test_parse_request_reports_malformed_sections() {
        let (request, ignored) = parse_request(json!({
            "query": "nurse",
            "filters": {"location": "Leeds"},
            "userProfile": {"skills": "SQL, Python"}
        }));
        assert_eq!(request.query, json!("nurse"));
        assert!(request.user_profile.is_none());
        assert_eq!(request.filters.unwrap().location.as_deref(), Some("Leeds"));
        assert_eq!(ignored, vec!["userProfile"]);

        let (request, ignored) = parse_request(json!({"query": "nurse", "filters": "everything"}));
        assert!(request.filters.is_none());
        assert_eq!(ignored, vec!["filters"]);
    }

    #[test]
    fn test_null_sections_count_as_absent() {
        let (request, ignored) =
            parse_request(json!({"query": "nurse", "filters": null, "userProfile": null}));
        assert!(request.filters.is_none());
        assert!(request.user_profile.is_none());
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_non_object_body_has_no_query() {
        let (request, ignored) = parse_request(json!(["nurse"]));
        assert!(request.query.is_null());
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
