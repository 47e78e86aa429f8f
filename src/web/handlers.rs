use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::analyze_use_case::{Analysis, AnalysisSettings};
use crate::domain::report::Report;
use crate::domain::review::SAMPLE_REVIEWS;
use crate::web::error::ApiError;
use crate::web::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub text:      String,
    pub maxlen:    Option<usize>,
    pub threshold: Option<f64>,
}

impl ClassifyRequest {
    fn settings(&self) -> Result<AnalysisSettings, ApiError> {
        let defaults = AnalysisSettings::default();
        AnalysisSettings::new(
            self.maxlen.unwrap_or(defaults.maxlen),
            self.threshold.unwrap_or(defaults.threshold),
        )
        .map_err(|e| ApiError::validation(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status:       &'static str,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error:        Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    examples: Vec<&'static str>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.analyzer.is_some();
    Json(HealthResponse {
        status:       if loaded { "ok" } else { "degraded" },
        model_loaded: loaded,
        error:        state.load_error.clone(),
    })
}

pub async fn examples() -> Json<ExamplesResponse> {
    Json(ExamplesResponse { examples: SAMPLE_REVIEWS.to_vec() })
}

pub async fn classify(
    State(state): State<AppState>,
    payload:      Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(analyze(&state, req).await?))
}

/// Same input as `classify`, answered with the report as a file download.
pub async fn report(
    State(state): State<AppState>,
    payload:      Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let analysis = analyze(&state, req).await?;
    let body = analysis
        .report
        .to_json_pretty()
        .map_err(|e| ApiError::internal(format!("Cannot serialise report: {e}")))?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", Report::FILE_NAME),
        ),
    ];
    Ok((headers, body).into_response())
}

async fn analyze(state: &AppState, req: ClassifyRequest) -> Result<Analysis, ApiError> {
    let analyzer = state.analyzer.clone().ok_or_else(|| {
        ApiError::model_unavailable(
            state.load_error.clone().unwrap_or_else(|| "Model is not loaded".to_string()),
        )
    })?;
    let settings = req.settings()?;

    // Inference is CPU/GPU bound; keep it off the async workers
    tokio::task::spawn_blocking(move || analyzer.classify(&req.text, settings))
        .await
        .map_err(|e| ApiError::internal(format!("Analysis task failed: {e}")))
}
