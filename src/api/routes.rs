use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use super::error::ApiError;
use crate::config;
use crate::inference::ReviewInference;
use crate::models::{Comment, Document, TrackFailure};
use crate::pipeline::{run_review, ReviewRequest};
use crate::report::format_summary;

/// Shared handler state: the inference capability plus defaults.
#[derive(Clone)]
pub struct ApiContext {
    pub inference: Arc<dyn ReviewInference>,
    pub default_tolerance: f64,
}

impl ApiContext {
    pub fn new(inference: Arc<dyn ReviewInference>, default_tolerance: f64) -> Self {
        Self {
            inference,
            default_tolerance,
        }
    }
}

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

// ──────────────────────────────────────────────
// GET /health
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
    })
}

// ──────────────────────────────────────────────
// POST /analyze
// ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub email_text: String,
    #[serde(default)]
    pub original_doc: Option<Document>,
    pub revised_doc: Document,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub run_tick_tie: bool,
    /// Render the summary without the comment sections.
    #[serde(default)]
    pub only_tick: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub summary: String,
    pub tags: Vec<Comment>,
    pub email_comments: Vec<Comment>,
    /// `{}` when tick-and-tie was not requested or did not complete.
    pub tick_tie: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TrackFailure>,
    pub generated_at: String,
}

async fn analyze(
    State(ctx): State<ApiContext>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let tolerance = request.tolerance.unwrap_or(ctx.default_tolerance);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ApiError::BadRequest(
            "tolerance must be a non-negative number".into(),
        ));
    }

    let only_tick = request.only_tick;
    let inference = ctx.inference.clone();

    info!(
        revised_pages = request.revised_doc.page_count(),
        run_tick_tie = request.run_tick_tie,
        "analyze request received"
    );

    // The pipeline is a chain of blocking inference calls; keep it off the
    // async runtime.
    let report = tokio::task::spawn_blocking(move || {
        let original = request.original_doc.unwrap_or_default();
        run_review(
            inference.as_ref(),
            &ReviewRequest {
                email_text: &request.email_text,
                original: &original,
                revised: &request.revised_doc,
                tolerance,
                run_tick_tie: request.run_tick_tie,
            },
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("review run aborted: {e}")))?;

    let tags = report.tags.unwrap_or_default();
    let email_comments = report.email_comments.unwrap_or_default();
    let summary = format_summary(
        &tags,
        &email_comments,
        report.tick_tie.as_ref(),
        !only_tick,
    );
    let tick_tie = match report.tick_tie {
        Some(tick) => serde_json::to_value(tick)
            .map_err(|e| ApiError::Internal(format!("tick-tie serialization: {e}")))?,
        None => serde_json::json!({}),
    };

    Ok(Json(AnalyzeResponse {
        summary,
        tags,
        email_comments,
        tick_tie,
        failures: report.failures,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }))
}
