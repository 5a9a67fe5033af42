//! Axum route handlers for the Scan API.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisResult, Section};
use crate::scan::extractor::RequiredSkill;
use crate::scan::pipeline::{AnalyzeOptions, Deadline};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Per-request overrides. Missing keys fall back to `Config`.
#[derive(Debug, Default, Deserialize)]
pub struct ScanOptions {
    pub max_input_bytes: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub taxonomy_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub resume_text: String,
    pub job_description_text: String,
    #[serde(default)]
    pub options: ScanOptions,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub scan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub taxonomy_version: String,
    pub result: AnalysisResult,
}

#[derive(Debug, Deserialize)]
pub struct RequirementsRequest {
    pub job_description_text: String,
    #[serde(default)]
    pub options: ScanOptions,
}

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub taxonomy_version: String,
    pub sections: Vec<Section>,
    pub required_skills: Vec<RequiredSkill>,
}

#[derive(Debug, Serialize)]
pub struct TaxonomyVersionInfo {
    pub version: String,
    pub skills: usize,
    pub forms: usize,
}

#[derive(Debug, Serialize)]
pub struct TaxonomyListResponse {
    pub default_version: String,
    pub versions: Vec<TaxonomyVersionInfo>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scan
///
/// Scores a resume against a job description and returns the full analysis.
pub async fn handle_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let Json(request) = payload?;
    let options = analyze_options(&state, &request.options);
    let engine = state.engine(request.options.taxonomy_version.as_deref())?;
    let taxonomy_version = engine.taxonomy().version().to_string();

    // CPU-bound pipeline: spawn_blocking to keep it off the async executor.
    let result = tokio::task::spawn_blocking(move || {
        engine.analyze(
            &request.resume_text,
            &request.job_description_text,
            &options,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in scan: {e}")))??;

    Ok(Json(ScanResponse {
        scan_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        taxonomy_version,
        result,
    }))
}

/// POST /api/v1/scan/requirements
///
/// Previews the sections and required skills found in a job description.
pub async fn handle_requirements(
    State(state): State<AppState>,
    payload: Result<Json<RequirementsRequest>, JsonRejection>,
) -> Result<Json<RequirementsResponse>, AppError> {
    let Json(request) = payload?;
    let options = analyze_options(&state, &request.options);
    let engine = state.engine(request.options.taxonomy_version.as_deref())?;
    let taxonomy_version = engine.taxonomy().version().to_string();

    let preview = tokio::task::spawn_blocking(move || {
        engine.preview_requirements(&request.job_description_text, &options)
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "spawn_blocking failed in requirements preview: {e}"
        ))
    })??;

    Ok(Json(RequirementsResponse {
        taxonomy_version,
        sections: preview.sections,
        required_skills: preview.required_skills,
    }))
}

/// GET /api/v1/taxonomy
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<TaxonomyListResponse> {
    let versions = state
        .taxonomies
        .iter()
        .map(|t| TaxonomyVersionInfo {
            version: t.version().to_string(),
            skills: t.skills().len(),
            forms: t.form_count(),
        })
        .collect();

    Json(TaxonomyListResponse {
        default_version: state.taxonomies.default_version().to_string(),
        versions,
    })
}

/// The deadline starts here, before the request waits for a blocking thread.
fn analyze_options(state: &AppState, options: &ScanOptions) -> AnalyzeOptions {
    let timeout_ms = options.timeout_ms.unwrap_or(state.config.scan_timeout_ms);
    AnalyzeOptions {
        max_input_bytes: options
            .max_input_bytes
            .unwrap_or(state.config.max_input_bytes),
        deadline: Deadline::after(Duration::from_millis(timeout_ms)),
    }
}
