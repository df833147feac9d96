//! HTTP request handlers for the service.
//!
//! Implements page submission and health check endpoints using axum.

use crate::pipeline::{Pipeline, PipelineError, Submission};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Largest accepted submission body (50 MiB)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline every submission runs through
    pub pipeline: Arc<Pipeline>,
}

/// Page submission request
///
/// Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Raw page HTML
    pub html: String,
    /// Capture time reported by the sender
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Page URL
    #[serde(default)]
    pub url: Option<String>,
    /// Document title
    #[serde(default)]
    pub page_title: Option<String>,
}

impl From<SubmitRequest> for Submission {
    fn from(request: SubmitRequest) -> Self {
        Submission {
            source_url: request.url,
            page_title: request.page_title,
            captured_at: request.timestamp,
            ..Submission::new(request.html)
        }
    }
}

/// Acknowledgement sent before processing starts
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Always true once the body parsed
    pub success: bool,
    /// Human-readable note
    pub message: String,
    /// Server time of receipt (RFC 3339)
    pub timestamp: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of job identifiers in the ledger
    pub seen_jobs: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Pipeline-related error
    PipelineError(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::PipelineError(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::PipelineError(e)
    }
}

/// POST /endpoint - Accept a captured page
///
/// Answers immediately; the pipeline runs in a background task and its
/// failures are only logged.
async fn submit_page(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    let submission = Submission::from(request);
    let id = submission.id;
    info!(submission = %id, bytes = submission.html.len(), "Page received");

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        match pipeline.process(submission).await {
            Ok(outcome) => info!(
                submission = %id,
                parsed = outcome.parsed,
                changed = outcome.changed,
                new = outcome.new_jobs,
                "Submission processed"
            ),
            Err(e) => error!(submission = %id, error = %e, "Submission failed"),
        }
    });

    Json(SubmitResponse {
        success: true,
        message: "Data received successfully".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health - Ledger-backed health check
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    let seen_jobs = state.pipeline.seen_jobs()?;

    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        seen_jobs,
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/endpoint", post(submit_page))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    #[test]
    fn test_request_ignores_unknown_fields() {
        let request: SubmitRequest = serde_json::from_str(
            r#"{"html": "<p></p>", "pageTitle": "Jobs", "referrer": "x", "viewport": [1, 2]}"#,
        )
        .unwrap();

        assert_eq!(request.page_title.as_deref(), Some("Jobs"));
        assert!(request.url.is_none());

        let submission = Submission::from(request);
        assert_eq!(submission.html, "<p></p>");
        assert_eq!(submission.page_title.as_deref(), Some("Jobs"));
    }

    #[tokio::test]
    async fn test_missing_html_is_rejected() {
        let app = create_router(crate::test_support::test_state().0);

        let request = Request::builder()
            .method("POST")
            .uri("/endpoint")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"url": "https://example.com"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(crate::test_support::test_state().0);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
