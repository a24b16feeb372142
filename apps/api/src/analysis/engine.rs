//! The comparison engine: runs every stage in order and returns either a complete report or
//! the fixed degraded report.
//!
//! The engine holds no per-request state. One instance (cheap to clone) is shared by all
//! requests; the classifier strategy is the only thing it carries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::analysis::actions::generate_action_items;
use crate::analysis::assembler::{assemble, degraded_result, PipelineOutput};
use crate::analysis::classifier::{KeywordSectionClassifier, SectionClassifier};
use crate::analysis::differences::analyze_differences;
use crate::analysis::error::{AnalysisError, ValidationError};
use crate::analysis::extractor::extract_sections;
use crate::analysis::findings::build_detailed_findings;
use crate::analysis::matcher::match_sections;
use crate::analysis::models::AnalysisResult;
use crate::analysis::quality::compute_quality_metrics;
use crate::analysis::risk::assess_risk;
use crate::analysis::scoring::build_compliance_matrix;
use crate::analysis::validation::validate_and_sanitize;
use crate::config::AnalysisConfig;

pub const SPEC_SECTION_PREFIX: &str = "spec";
pub const SUBMITTAL_SECTION_PREFIX: &str = "sub";

/// One comparison to run. `requested_at` is the clock every due date and timestamp derives
/// from, so identical requests produce identical reports.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub analysis_id: String,
    pub submittal_text: String,
    pub specification_text: String,
    pub config: AnalysisConfig,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete(AnalysisResult),
    /// The pipeline faulted; `result` is the fixed fail-safe report.
    Degraded {
        result: AnalysisResult,
        reason: String,
    },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Complete(result) => result,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Complete(result) => result,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }
}

#[derive(Clone)]
pub struct ComparisonEngine {
    classifier: Arc<dyn SectionClassifier>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(Arc::new(KeywordSectionClassifier))
    }
}

impl ComparisonEngine {
    pub fn new(classifier: Arc<dyn SectionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &dyn SectionClassifier {
        self.classifier.as_ref()
    }

    /// Never fails: pipeline faults come back as `AnalysisOutcome::Degraded`.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        match self.run_pipeline(request) {
            Ok(result) => {
                info!(
                    "Analysis {} complete: score {:.2}, {:?}, {} finding(s)",
                    request.analysis_id,
                    result.score,
                    result.overall_assessment,
                    result.detailed_findings.len()
                );
                AnalysisOutcome::Complete(result)
            }
            Err(e) => {
                warn!("Analysis {} degraded: {e}", request.analysis_id);
                AnalysisOutcome::Degraded {
                    result: degraded_result(
                        &request.analysis_id,
                        request.requested_at,
                        self.classifier.name(),
                    ),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `analyze`, then schema validation with sanitisation of the report inside the outcome.
    pub fn analyze_validated(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, ValidationError> {
        Ok(match self.analyze(request) {
            AnalysisOutcome::Complete(result) => {
                AnalysisOutcome::Complete(validate_and_sanitize(result)?)
            }
            AnalysisOutcome::Degraded { result, reason } => AnalysisOutcome::Degraded {
                result: validate_and_sanitize(result)?,
                reason,
            },
        })
    }

    fn run_pipeline(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let config = &request.config;
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(format!("{e:#}")))?;

        let classifier = self.classifier.as_ref();
        let spec_sections =
            extract_sections(&request.specification_text, SPEC_SECTION_PREFIX, classifier);
        let submittal_sections =
            extract_sections(&request.submittal_text, SUBMITTAL_SECTION_PREFIX, classifier);
        debug!(
            "Analysis {}: {} specification section(s), {} submittal section(s)",
            request.analysis_id,
            spec_sections.len(),
            submittal_sections.len()
        );

        let outcome = match_sections(&spec_sections, &submittal_sections, config);
        let report = analyze_differences(&spec_sections, &submittal_sections, outcome, config)?;

        let detailed_findings = build_detailed_findings(&report.detail, &spec_sections);
        let compliance_matrix =
            build_compliance_matrix(&spec_sections, &report.detail, &detailed_findings, config);
        let risk_assessment = assess_risk(&detailed_findings);
        let quality_metrics = compute_quality_metrics(
            &detailed_findings,
            submittal_sections.len(),
            spec_sections.len(),
        );
        let action_items = generate_action_items(&detailed_findings, request.requested_at);

        assemble(PipelineOutput {
            analysis_id: &request.analysis_id,
            requested_at: request.requested_at,
            classifier: classifier.name(),
            config,
            submittal_sections: submittal_sections.len(),
            specification_sections: spec_sections.len(),
            detail: report.detail,
            confidence: report.confidence,
            detailed_findings,
            compliance_matrix,
            risk_assessment,
            quality_metrics,
            action_items,
        })
    }
}
