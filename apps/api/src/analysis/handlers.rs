use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::engine::{AnalysisOutcome, AnalysisRequest, SPEC_SECTION_PREFIX};
use crate::analysis::extractor::extract_sections;
use crate::analysis::models::{AnalysisResult, DocumentSection};
use crate::config::AnalysisOverrides;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateAnalysisRequest {
    pub analysis_id: Option<String>,
    pub submittal_text: String,
    pub specification_text: String,
    /// Overrides individual service defaults for this analysis only.
    pub options: Option<AnalysisOverrides>,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub result: AnalysisResult,
}

/// POST /api/v1/analyses
pub async fn handle_create_analysis(
    State(state): State<AppState>,
    Json(req): Json<CreateAnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let config = req
        .options
        .unwrap_or_default()
        .apply_to(&state.config.analysis);
    config
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = AnalysisRequest {
        analysis_id: req
            .analysis_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        submittal_text: req.submittal_text,
        specification_text: req.specification_text,
        config,
        requested_at: Utc::now(),
    };

    // CPU-bound; run off the async workers.
    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.analyze_validated(&request))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let degraded_reason = match &outcome {
        AnalysisOutcome::Degraded { reason, .. } => Some(reason.clone()),
        AnalysisOutcome::Complete(_) => None,
    };
    Ok(Json(AnalysisResponse {
        degraded: degraded_reason.is_some(),
        degraded_reason,
        result: outcome.into_result(),
    }))
}

#[derive(Deserialize)]
pub struct ExtractSectionsRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ExtractSectionsResponse {
    pub classifier: &'static str,
    pub sections: Vec<DocumentSection>,
}

/// POST /api/v1/sections/extract
pub async fn handle_extract_sections(
    State(state): State<AppState>,
    Json(req): Json<ExtractSectionsRequest>,
) -> Result<Json<ExtractSectionsResponse>, AppError> {
    let classifier = state.engine.classifier();
    let sections = extract_sections(&req.text, SPEC_SECTION_PREFIX, classifier);
    Ok(Json(ExtractSectionsResponse {
        classifier: classifier.name(),
        sections,
    }))
}
