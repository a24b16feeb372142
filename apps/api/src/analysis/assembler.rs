//! Result assembly: merges every stage into one `AnalysisResult` carrying both the legacy
//! flat view and the enhanced view, plus the fixed degraded result used on internal faults.

use chrono::{DateTime, Utc};

use crate::analysis::categories::FindingCategory;
use crate::analysis::error::AnalysisError;
use crate::analysis::findings::legacy_findings;
use crate::analysis::models::{
    ActionItem, AnalysisMetadata, AnalysisResult, CategoryScore, ComparisonDetail,
    ComplianceCategory, ComplianceMatrix, Complexity, DetailedFinding, ExcessAction, Level,
    OverallAssessment, QualityMetrics, RiskAssessment,
};
use crate::config::AnalysisConfig;

/// Label recorded as the producing model in report metadata.
pub const ENGINE_MODEL: &str = "token-overlap-comparison-v1";

/// Everything the pipeline produced for one analysis.
pub struct PipelineOutput<'a> {
    pub analysis_id: &'a str,
    pub requested_at: DateTime<Utc>,
    pub classifier: &'static str,
    pub config: &'a AnalysisConfig,
    pub submittal_sections: usize,
    pub specification_sections: usize,
    pub detail: ComparisonDetail,
    pub confidence: f64,
    pub detailed_findings: Vec<DetailedFinding>,
    pub compliance_matrix: ComplianceMatrix,
    pub risk_assessment: RiskAssessment,
    pub quality_metrics: QualityMetrics,
    pub action_items: Vec<ActionItem>,
}

/// Non-compliant on any critical issue, otherwise banded by the overall score.
pub fn overall_assessment(matrix: &ComplianceMatrix) -> OverallAssessment {
    if matrix.critical_issues > 0 {
        OverallAssessment::NonCompliant
    } else if matrix.overall_score >= 90.0 {
        OverallAssessment::Compliant
    } else if matrix.overall_score >= 70.0 {
        OverallAssessment::PartiallyCompliant
    } else {
        OverallAssessment::RequiresReview
    }
}

pub fn complexity_for(total_sections: usize) -> Complexity {
    match total_sections {
        0..=5 => Complexity::Simple,
        6..=15 => Complexity::Moderate,
        _ => Complexity::Complex,
    }
}

pub fn legacy_categories(matrix: &ComplianceMatrix) -> Vec<CategoryScore> {
    matrix
        .categories
        .iter()
        .map(|c| CategoryScore {
            name: c.name,
            score: c.score,
            status: c.status,
        })
        .collect()
}

fn build_recommendations(out: &PipelineOutput<'_>) -> Vec<String> {
    let matrix = &out.compliance_matrix;
    let mut recommendations = Vec::new();

    if matrix.critical_issues > 0 {
        recommendations.push(format!(
            "Resolve {} critical issue(s) before approval",
            matrix.critical_issues
        ));
    }
    if matrix.critical_issues > out.config.max_critical_issues {
        recommendations.push(format!(
            "Critical issues exceed the tolerance of {}; reject and request a complete resubmittal",
            out.config.max_critical_issues
        ));
    }
    if !out.detail.missing_elements.is_empty() {
        recommendations.push(format!(
            "Provide documentation for {} missing specification requirement(s)",
            out.detail.missing_elements.len()
        ));
    }
    if matrix.major_issues > 0 {
        recommendations.push(format!(
            "Correct {} major discrepancy(ies) in the next revision",
            matrix.major_issues
        ));
    }
    let to_clarify = out
        .detail
        .excess_elements
        .iter()
        .filter(|e| e.action != ExcessAction::Accept)
        .count();
    if to_clarify > 0 {
        recommendations.push(format!(
            "Clarify or remove {to_clarify} submittal section(s) not referenced by the specification"
        ));
    }
    if recommendations.is_empty() {
        recommendations
            .push("Submittal appears compliant; proceed with standard approval".to_string());
    }
    recommendations
}

fn build_summary(out: &PipelineOutput<'_>, assessment: OverallAssessment) -> String {
    let matrix = &out.compliance_matrix;
    let mut summary = format!(
        "Compared {} submittal section(s) against {} specification section(s): {} match(es), {} missing, {} excess. \
         Overall compliance {:.1}/100 ({}).",
        out.submittal_sections,
        out.specification_sections,
        out.detail.matches.len(),
        out.detail.missing_elements.len(),
        out.detail.excess_elements.len(),
        matrix.overall_score,
        assessment_label(assessment),
    );
    if matrix.critical_issues > out.config.max_critical_issues {
        summary.push_str(&format!(
            " {} critical issue(s) exceed the tolerance of {}.",
            matrix.critical_issues, out.config.max_critical_issues
        ));
    }
    summary
}

fn assessment_label(assessment: OverallAssessment) -> &'static str {
    match assessment {
        OverallAssessment::Compliant => "compliant",
        OverallAssessment::PartiallyCompliant => "partially compliant",
        OverallAssessment::NonCompliant => "non-compliant",
        OverallAssessment::RequiresReview => "requires review",
    }
}

/// Assembles the report, rejecting pipeline output that breaks the matrix or score invariants.
pub fn assemble(out: PipelineOutput<'_>) -> Result<AnalysisResult, AnalysisError> {
    let absent: Vec<&str> = FindingCategory::ALL
        .iter()
        .filter(|c| !out.compliance_matrix.categories.iter().any(|row| row.name == **c))
        .map(|c| c.as_str())
        .collect();
    if !absent.is_empty() {
        return Err(AnalysisError::IncompleteMatrix(absent.join(", ")));
    }
    if !out.compliance_matrix.overall_score.is_finite() {
        return Err(AnalysisError::NonFiniteScore("overall_score"));
    }
    if !out.confidence.is_finite() {
        return Err(AnalysisError::NonFiniteScore("confidence"));
    }
    if !out.quality_metrics.overall_quality.is_finite() {
        return Err(AnalysisError::NonFiniteScore("overall_quality"));
    }

    let assessment = overall_assessment(&out.compliance_matrix);
    let summary = build_summary(&out, assessment);
    let recommendations = build_recommendations(&out);

    Ok(AnalysisResult {
        score: out.compliance_matrix.overall_score,
        overall_assessment: assessment,
        summary,
        findings: legacy_findings(&out.detailed_findings),
        recommendations,
        categories: legacy_categories(&out.compliance_matrix),
        confidence: out.confidence,
        metadata: AnalysisMetadata {
            analysis_id: out.analysis_id.to_string(),
            timestamp: out.requested_at,
            model: ENGINE_MODEL.to_string(),
            classifier: out.classifier.to_string(),
            complexity: complexity_for(out.submittal_sections + out.specification_sections),
            submittal_sections: out.submittal_sections,
            specification_sections: out.specification_sections,
        },
        detailed_findings: out.detailed_findings,
        compliance_matrix: out.compliance_matrix,
        risk_assessment: out.risk_assessment,
        quality_metrics: out.quality_metrics,
        action_items: out.action_items,
        comparison: out.detail,
    })
}

/// The fixed fail-safe report: score 0, requires-review, high risk, no findings.
///
/// Matrix rows are still present (as unexercised) so the report stays structurally valid.
pub fn degraded_result(
    analysis_id: &str,
    requested_at: DateTime<Utc>,
    classifier: &'static str,
) -> AnalysisResult {
    let categories: Vec<ComplianceCategory> = FindingCategory::ALL
        .into_iter()
        .map(ComplianceCategory::unexercised)
        .collect();
    let matrix = ComplianceMatrix {
        overall_score: 0.0,
        categories,
        summary: "Analysis could not be completed; manual review required.".to_string(),
        critical_issues: 0,
        major_issues: 0,
        minor_issues: 0,
        compliant_items: 0,
    };

    AnalysisResult {
        score: 0.0,
        overall_assessment: OverallAssessment::RequiresReview,
        summary: "Automated comparison failed; the submittal requires manual review.".to_string(),
        findings: Vec::new(),
        recommendations: vec!["Perform a manual review of the submittal".to_string()],
        categories: legacy_categories(&matrix),
        confidence: 0.1,
        metadata: AnalysisMetadata {
            analysis_id: analysis_id.to_string(),
            timestamp: requested_at,
            model: ENGINE_MODEL.to_string(),
            classifier: classifier.to_string(),
            complexity: Complexity::Simple,
            submittal_sections: 0,
            specification_sections: 0,
        },
        detailed_findings: Vec::new(),
        compliance_matrix: matrix,
        risk_assessment: RiskAssessment {
            overall_risk: Level::High,
            risk_factors: Vec::new(),
            mitigation_strategies: Vec::new(),
            residual_risk: Level::Medium,
        },
        quality_metrics: QualityMetrics {
            documentation_quality: 0.0,
            technical_accuracy: 0.0,
            completeness: 0.0,
            clarity: 0.0,
            consistency: 0.0,
            compliance_readiness: 0.0,
            overall_quality: 0.0,
            improvement_areas: vec![
                "documentation_quality".to_string(),
                "technical_accuracy".to_string(),
                "completeness".to_string(),
                "clarity".to_string(),
                "consistency".to_string(),
                "compliance_readiness".to_string(),
            ],
        },
        action_items: Vec::new(),
        comparison: ComparisonDetail::default(),
    }
}
