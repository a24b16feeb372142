//! Output schema validation and sanitisation.
//!
//! `validate_result` only reports. `sanitize_result` repairs every reported issue with a fixed
//! default, so a sanitised report always validates and sanitising it again changes nothing.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::analysis::assembler::legacy_categories;
use crate::analysis::categories::FindingCategory;
use crate::analysis::error::ValidationError;
use crate::analysis::findings::{legacy_findings, severity_counts};
use crate::analysis::models::{
    AnalysisResult, ComplianceCategory, OverallAssessment, QualityMetrics,
};
use crate::analysis::quality::improvement_areas;

pub const DEFAULT_ANALYSIS_ID: &str = "unknown-analysis";
pub const DEFAULT_CONFIDENCE: f64 = 0.1;
pub const MAX_ACTION_ITEMS: usize = 3;
pub const MAX_RISK_SCORE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

fn in_range(value: f64, max: f64) -> bool {
    value.is_finite() && (0.0..=max).contains(&value)
}

fn quality_values(q: &QualityMetrics) -> [(&'static str, f64); 7] {
    [
        ("documentation_quality", q.documentation_quality),
        ("technical_accuracy", q.technical_accuracy),
        ("completeness", q.completeness),
        ("clarity", q.clarity),
        ("consistency", q.consistency),
        ("compliance_readiness", q.compliance_readiness),
        ("overall_quality", q.overall_quality),
    ]
}

pub fn validate_result(result: &AnalysisResult) -> ValidationReport {
    let mut issues = Vec::new();
    let matrix = &result.compliance_matrix;

    if result.metadata.analysis_id.trim().is_empty() {
        issues.push(ValidationIssue::new("metadata.analysis_id", "is empty"));
    }

    if !in_range(result.score, 100.0) {
        issues.push(ValidationIssue::new("score", format!("{} is outside 0-100", result.score)));
    }
    if !in_range(matrix.overall_score, 100.0) {
        issues.push(ValidationIssue::new(
            "compliance_matrix.overall_score",
            format!("{} is outside 0-100", matrix.overall_score),
        ));
    }
    if result.score != matrix.overall_score {
        issues.push(ValidationIssue::new(
            "score",
            "differs from compliance_matrix.overall_score",
        ));
    }
    if !in_range(result.confidence, 1.0) {
        issues.push(ValidationIssue::new(
            "confidence",
            format!("{} is outside 0-1", result.confidence),
        ));
    }

    let names: Vec<FindingCategory> = matrix.categories.iter().map(|c| c.name).collect();
    if names != FindingCategory::ALL {
        issues.push(ValidationIssue::new(
            "compliance_matrix.categories",
            "must hold exactly one row per category in canonical order",
        ));
    }
    for row in &matrix.categories {
        if row.score > 100 {
            issues.push(ValidationIssue::new(
                "compliance_matrix.categories",
                format!("{} score {} exceeds 100", row.name, row.score),
            ));
        }
        if row.weight != row.name.weight() {
            issues.push(ValidationIssue::new(
                "compliance_matrix.categories",
                format!("{} weight {} is not canonical", row.name, row.weight),
            ));
        }
    }
    if result.categories != legacy_categories(matrix) {
        issues.push(ValidationIssue::new(
            "categories",
            "does not mirror the compliance matrix",
        ));
    }

    let counts = severity_counts(&result.detailed_findings);
    if (matrix.critical_issues, matrix.major_issues, matrix.minor_issues) != counts {
        issues.push(ValidationIssue::new(
            "compliance_matrix",
            "issue counts do not match detailed findings",
        ));
    }
    if matrix.critical_issues > 0 && result.overall_assessment != OverallAssessment::NonCompliant {
        issues.push(ValidationIssue::new(
            "overall_assessment",
            "must be non-compliant when critical issues exist",
        ));
    }

    let mut seen = HashSet::new();
    for finding in &result.detailed_findings {
        if finding.id.trim().is_empty() {
            issues.push(ValidationIssue::new("detailed_findings", "finding with empty id"));
        } else if !seen.insert(finding.id.as_str()) {
            issues.push(ValidationIssue::new(
                "detailed_findings",
                format!("duplicate finding id {}", finding.id),
            ));
        }
    }

    if result.findings != legacy_findings(&result.detailed_findings) {
        issues.push(ValidationIssue::new(
            "findings",
            "does not mirror the detailed findings",
        ));
    }
    let dangling = result
        .detailed_findings
        .iter()
        .flat_map(|f| &f.related_findings)
        .chain(result.action_items.iter().flat_map(|a| &a.related_findings))
        .filter(|id| !seen.contains(id.as_str()))
        .count();
    if dangling > 0 {
        issues.push(ValidationIssue::new(
            "related_findings",
            format!("{dangling} reference(s) to unknown finding ids"),
        ));
    }

    for (name, value) in quality_values(&result.quality_metrics) {
        if !in_range(value, 100.0) {
            issues.push(ValidationIssue::new(
                "quality_metrics",
                format!("{name} {value} is outside 0-100"),
            ));
        }
    }
    if result.quality_metrics.improvement_areas != improvement_areas(&result.quality_metrics) {
        issues.push(ValidationIssue::new(
            "quality_metrics.improvement_areas",
            "does not match the metrics below threshold",
        ));
    }

    for factor in &result.risk_assessment.risk_factors {
        if factor.risk_score > MAX_RISK_SCORE {
            issues.push(ValidationIssue::new(
                "risk_assessment.risk_factors",
                format!("{} risk score {} exceeds 10", factor.category, factor.risk_score),
            ));
        }
    }

    if result.action_items.len() > MAX_ACTION_ITEMS {
        issues.push(ValidationIssue::new(
            "action_items",
            format!("{} items exceed the limit of {MAX_ACTION_ITEMS}", result.action_items.len()),
        ));
    }

    ValidationReport {
        passed: issues.is_empty(),
        issues,
    }
}

fn clamp_or(value: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        fallback
    }
}

/// One row per category in canonical order; the first row seen for a category wins.
fn canonical_rows(rows: Vec<ComplianceCategory>) -> Vec<ComplianceCategory> {
    FindingCategory::ALL
        .into_iter()
        .map(|category| {
            match rows.iter().find(|row| row.name == category) {
                Some(row) => ComplianceCategory {
                    score: row.score.min(100),
                    weight: category.weight(),
                    ..row.clone()
                },
                None => ComplianceCategory::unexercised(category),
            }
        })
        .collect()
}

/// Gives every empty or duplicate finding id a fresh `F-NNN` id not used elsewhere.
fn dedupe_finding_ids(result: &mut AnalysisResult) {
    let mut used: HashSet<String> = result
        .detailed_findings
        .iter()
        .map(|f| f.id.clone())
        .filter(|id| !id.trim().is_empty())
        .collect();
    let mut seen = HashSet::new();
    let mut next = 1;

    for finding in &mut result.detailed_findings {
        if !finding.id.trim().is_empty() && seen.insert(finding.id.clone()) {
            continue;
        }
        let fresh = loop {
            let candidate = format!("F-{next:03}");
            next += 1;
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(fresh.clone());
        seen.insert(fresh.clone());
        finding.id = fresh;
    }
}

/// Drops cross-references to ids no detailed finding carries.
fn prune_related_findings(result: &mut AnalysisResult) {
    let known: HashSet<String> = result
        .detailed_findings
        .iter()
        .map(|f| f.id.clone())
        .collect();
    for finding in &mut result.detailed_findings {
        finding.related_findings.retain(|id| known.contains(id));
    }
    for item in &mut result.action_items {
        item.related_findings.retain(|id| known.contains(id));
    }
}

/// Repairs a report with fixed defaults.
pub fn sanitize_result(mut result: AnalysisResult) -> AnalysisResult {
    if result.metadata.analysis_id.trim().is_empty() {
        result.metadata.analysis_id = DEFAULT_ANALYSIS_ID.to_string();
    }

    let matrix = &mut result.compliance_matrix;
    matrix.overall_score = clamp_or(matrix.overall_score, 100.0, 0.0);
    matrix.categories = canonical_rows(std::mem::take(&mut matrix.categories));

    dedupe_finding_ids(&mut result);
    prune_related_findings(&mut result);
    result.findings = legacy_findings(&result.detailed_findings);
    let (critical, major, minor) = severity_counts(&result.detailed_findings);
    let matrix = &mut result.compliance_matrix;
    matrix.critical_issues = critical;
    matrix.major_issues = major;
    matrix.minor_issues = minor;

    result.score = result.compliance_matrix.overall_score;
    result.confidence = clamp_or(result.confidence, 1.0, DEFAULT_CONFIDENCE);
    result.categories = legacy_categories(&result.compliance_matrix);
    if critical > 0 {
        result.overall_assessment = OverallAssessment::NonCompliant;
    }

    let q = &mut result.quality_metrics;
    q.documentation_quality = clamp_or(q.documentation_quality, 100.0, 0.0);
    q.technical_accuracy = clamp_or(q.technical_accuracy, 100.0, 0.0);
    q.completeness = clamp_or(q.completeness, 100.0, 0.0);
    q.clarity = clamp_or(q.clarity, 100.0, 0.0);
    q.consistency = clamp_or(q.consistency, 100.0, 0.0);
    q.compliance_readiness = clamp_or(q.compliance_readiness, 100.0, 0.0);
    q.overall_quality = clamp_or(q.overall_quality, 100.0, 0.0);
    q.improvement_areas = improvement_areas(q);

    for factor in &mut result.risk_assessment.risk_factors {
        factor.risk_score = factor.risk_score.min(MAX_RISK_SCORE);
    }

    result.action_items.truncate(MAX_ACTION_ITEMS);
    result
}

/// Returns the report unchanged when valid, otherwise sanitises it and validates again.
pub fn validate_and_sanitize(result: AnalysisResult) -> Result<AnalysisResult, ValidationError> {
    let report = validate_result(&result);
    if report.passed {
        return Ok(result);
    }

    warn!(
        "Sanitising analysis {} ({} validation issue(s))",
        result.metadata.analysis_id,
        report.issues.len()
    );
    let sanitized = sanitize_result(result);
    let recheck = validate_result(&sanitized);
    if recheck.passed {
        Ok(sanitized)
    } else {
        Err(ValidationError::Unsanitizable(recheck.issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assembler::degraded_result;
    use crate::analysis::models::{
        DetailedFinding, FindingSource, FindingStatus, Level, RiskFactor, Severity, Urgency,
    };
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn base() -> AnalysisResult {
        degraded_result(
            "analysis-1",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            "keyword",
        )
    }

    fn finding(id: &str, severity: Severity) -> DetailedFinding {
        DetailedFinding {
            id: id.to_string(),
            source: FindingSource::MissingElement,
            title: "1. FIRE RATING".to_string(),
            description: String::new(),
            severity,
            category: FindingCategory::SafetyRequirements,
            impact: Level::High,
            urgency: Urgency::Immediate,
            effort: Level::Medium,
            risk_level: Level::High,
            compliance_status: FindingStatus::NonCompliant,
            corrective_action: String::new(),
            timeline: String::new(),
            responsible_party: String::new(),
            location: "spec-1".to_string(),
            related_findings: vec![],
        }
    }

    #[test]
    fn test_degraded_result_is_valid() {
        let report = validate_result(&base());
        assert!(report.passed, "{:?}", report.issues);
    }

    #[test]
    fn test_valid_result_passes_through_unchanged() {
        let result = base();
        assert_eq!(validate_and_sanitize(result.clone()).unwrap(), result);
    }

    #[test]
    fn test_empty_id_gets_default() {
        let mut result = base();
        result.metadata.analysis_id = "  ".to_string();
        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.metadata.analysis_id, DEFAULT_ANALYSIS_ID);
    }

    #[test]
    fn test_non_finite_values_get_defaults() {
        let mut result = base();
        result.score = f64::NAN;
        result.compliance_matrix.overall_score = f64::INFINITY;
        result.confidence = f64::NAN;
        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.score, 0.0);
        assert_eq!(fixed.compliance_matrix.overall_score, 0.0);
        assert_eq!(fixed.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut result = base();
        result.compliance_matrix.overall_score = 140.0;
        result.score = 140.0;
        result.confidence = 1.7;
        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.score, 100.0);
        assert_eq!(fixed.confidence, 1.0);
    }

    #[test]
    fn test_missing_and_duplicate_categories_are_rebuilt() {
        let mut result = base();
        result
            .compliance_matrix
            .categories
            .retain(|c| c.name != FindingCategory::Documentation);
        let dup = result.compliance_matrix.categories[0].clone();
        result.compliance_matrix.categories.push(dup);
        result.compliance_matrix.categories[1].weight = 0.1;

        assert!(!validate_result(&result).passed);
        let fixed = validate_and_sanitize(result).unwrap();
        let names: Vec<_> = fixed.compliance_matrix.categories.iter().map(|c| c.name).collect();
        assert_eq!(names, FindingCategory::ALL.to_vec());
        assert_eq!(
            fixed.compliance_matrix.categories[1].weight,
            FindingCategory::DimensionalRequirements.weight()
        );
        assert_eq!(fixed.categories.len(), 10);
    }

    #[test]
    fn test_counts_and_assessment_follow_findings() {
        let mut result = base();
        result.detailed_findings = vec![finding("F-001", Severity::Critical)];
        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.compliance_matrix.critical_issues, 1);
        assert_eq!(fixed.overall_assessment, OverallAssessment::NonCompliant);
    }

    #[test]
    fn test_duplicate_finding_ids_are_renumbered() {
        let mut result = base();
        result.detailed_findings = vec![
            finding("F-001", Severity::Minor),
            finding("F-001", Severity::Minor),
            finding("", Severity::Minor),
        ];
        let fixed = validate_and_sanitize(result).unwrap();
        let ids: Vec<_> = fixed.detailed_findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F-001", "F-002", "F-003"]);
    }

    #[test]
    fn test_renumbered_ids_reach_legacy_findings_and_references() {
        let mut result = base();
        let mut first = finding("F-001", Severity::Major);
        first.related_findings = vec!["F-001".to_string(), "F-009".to_string()];
        result.detailed_findings = vec![first, finding("F-001", Severity::Minor)];
        let mut item = crate::analysis::actions::generate_action_items(
            &result.detailed_findings,
            Utc::now(),
        )
        .remove(0);
        item.related_findings = vec!["F-001".to_string(), "F-009".to_string()];
        result.action_items = vec![item];

        let fixed = validate_and_sanitize(result).unwrap();
        let detailed: Vec<_> = fixed.detailed_findings.iter().map(|f| f.id.as_str()).collect();
        let legacy: Vec<_> = fixed.findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(detailed, vec!["F-001", "F-002"]);
        assert_eq!(legacy, detailed);
        assert_eq!(fixed.detailed_findings[0].related_findings, vec!["F-001"]);
        assert_eq!(fixed.action_items[0].related_findings, vec!["F-001"]);
    }

    #[test]
    fn test_stale_legacy_findings_are_flagged() {
        let mut result = base();
        result.detailed_findings = vec![finding("F-001", Severity::Minor)];
        result.compliance_matrix.minor_issues = 1;
        let report = validate_result(&result);
        assert!(report.issues.iter().any(|i| i.field == "findings"));
    }

    #[test]
    fn test_risk_scores_and_action_items_are_capped() {
        let mut result = base();
        result.risk_assessment.risk_factors.push(RiskFactor {
            category: "Compliance Risk".to_string(),
            description: String::new(),
            probability: Level::High,
            impact: Level::Critical,
            risk_score: 42,
            mitigation_required: true,
        });
        let item = crate::analysis::actions::generate_action_items(
            &[finding("F-001", Severity::Minor)],
            Utc::now(),
        )
        .remove(0);
        result.action_items = vec![item; 5];

        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.risk_assessment.risk_factors[0].risk_score, 10);
        assert_eq!(fixed.action_items.len(), MAX_ACTION_ITEMS);
    }

    #[test]
    fn test_improvement_areas_are_recomputed() {
        let mut result = base();
        result.quality_metrics.improvement_areas.clear();
        let fixed = validate_and_sanitize(result).unwrap();
        assert_eq!(fixed.quality_metrics.improvement_areas.len(), 6);
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(
            score in prop::num::f64::ANY,
            overall in prop::num::f64::ANY,
            confidence in prop::num::f64::ANY,
            clarity in prop::num::f64::ANY,
            risk_score in any::<u8>(),
            drop_rows in 0usize..10,
        ) {
            let mut result = base();
            result.score = score;
            result.compliance_matrix.overall_score = overall;
            result.confidence = confidence;
            result.quality_metrics.clarity = clarity;
            result.compliance_matrix.categories.truncate(10 - drop_rows);
            result.risk_assessment.risk_factors.push(RiskFactor {
                category: "Compliance Risk".to_string(),
                description: String::new(),
                probability: Level::High,
                impact: Level::Critical,
                risk_score,
                mitigation_required: true,
            });

            let once = sanitize_result(result);
            prop_assert!(validate_result(&once).passed);
            let twice = sanitize_result(once.clone());
            prop_assert_eq!(&twice, &once);
            prop_assert_eq!(validate_and_sanitize(once.clone()).unwrap(), once);
        }
    }
}
