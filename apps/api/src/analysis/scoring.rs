//! Compliance scoring: per-category pass/fail over specification sections, aggregated into a
//! weighted overall score.
//!
//! Every category in `FindingCategory::ALL` gets a row. A category with nothing to check
//! scores 100 and is `review-required`, so it can never lower the overall score.

use std::collections::HashSet;

use tracing::debug;

use crate::analysis::categories::FindingCategory;
use crate::analysis::findings::severity_counts;
use crate::analysis::models::{
    CategoryStatus, ComparisonDetail, ComplianceCategory, ComplianceMatrix, DetailedFinding,
    DocumentSection, Severity,
};
use crate::config::AnalysisConfig;

/// Matches above this score count as compliant items.
const COMPLIANT_MATCH_SCORE: f64 = 0.8;

/// Status for an exercised category.
pub fn category_status(
    score: u32,
    has_critical_failures: bool,
    config: &AnalysisConfig,
) -> CategoryStatus {
    if has_critical_failures {
        CategoryStatus::Fail
    } else if score >= config.compliance_pass_score {
        CategoryStatus::Pass
    } else if score >= config.conditional_score {
        CategoryStatus::Conditional
    } else {
        CategoryStatus::Fail
    }
}

/// One row per category, in canonical order.
///
/// An item is a specification section. It passes when at least one submittal section
/// matched it and none of its differences requires correction.
pub fn score_categories(
    spec_sections: &[DocumentSection],
    detail: &ComparisonDetail,
    config: &AnalysisConfig,
) -> Vec<ComplianceCategory> {
    let matched: HashSet<&str> = detail
        .matches
        .iter()
        .map(|m| m.spec_section_id.as_str())
        .collect();
    let needs_correction: HashSet<&str> = detail
        .differences
        .iter()
        .filter(|d| d.correction_required)
        .map(|d| d.spec_section_id.as_str())
        .collect();
    let critical: HashSet<&str> = detail
        .differences
        .iter()
        .filter(|d| d.severity == Severity::Critical)
        .map(|d| d.spec_section_id.as_str())
        .chain(
            detail
                .missing_elements
                .iter()
                .filter(|m| m.criticality == Severity::Critical)
                .map(|m| m.spec_section_id.as_str()),
        )
        .collect();

    FindingCategory::ALL
        .into_iter()
        .map(|category| {
            let items: Vec<&DocumentSection> = spec_sections
                .iter()
                .filter(|s| s.category == category)
                .collect();

            if items.is_empty() {
                return ComplianceCategory::unexercised(category);
            }

            let items_checked = items.len();
            let items_passed = items
                .iter()
                .filter(|s| {
                    matched.contains(s.id.as_str()) && !needs_correction.contains(s.id.as_str())
                })
                .count();
            let critical_failures: Vec<String> = items
                .iter()
                .filter(|s| critical.contains(s.id.as_str()))
                .map(|s| s.display_title().to_string())
                .collect();

            let score = ((items_passed as f64 / items_checked as f64) * 100.0).round() as u32;
            let status = category_status(score, !critical_failures.is_empty(), config);

            ComplianceCategory {
                name: category,
                score,
                weight: category.weight(),
                status,
                items_checked,
                items_passed,
                critical_failures,
            }
        })
        .collect()
}

/// Σ(score × weight) / Σ(weight), rounded to two decimals.
pub fn weighted_overall(categories: &[ComplianceCategory]) -> f64 {
    let total_weight: f64 = categories.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = categories
        .iter()
        .map(|c| c.score as f64 * c.weight)
        .sum();
    ((weighted / total_weight) * 100.0).round() / 100.0
}

/// Builds the full matrix: category rows, overall score and issue tallies.
pub fn build_compliance_matrix(
    spec_sections: &[DocumentSection],
    detail: &ComparisonDetail,
    findings: &[DetailedFinding],
    config: &AnalysisConfig,
) -> ComplianceMatrix {
    let categories = score_categories(spec_sections, detail, config);
    let overall_score = weighted_overall(&categories);
    let (critical_issues, major_issues, minor_issues) = severity_counts(findings);
    let compliant_items = detail
        .matches
        .iter()
        .filter(|m| m.match_score > COMPLIANT_MATCH_SCORE)
        .count();

    let exercised = categories.iter().filter(|c| c.items_checked > 0).count();
    let passing = categories
        .iter()
        .filter(|c| c.status == CategoryStatus::Pass)
        .count();
    let summary = format!(
        "{passing} of {exercised} exercised categories pass; weighted compliance {overall_score:.1}/100 \
         with {critical_issues} critical, {major_issues} major and {minor_issues} minor issue(s)."
    );

    debug!(
        "Compliance matrix: overall {:.2}, {} exercised categories",
        overall_score, exercised
    );

    ComplianceMatrix {
        overall_score,
        categories,
        summary,
        critical_issues,
        major_issues,
        minor_issues,
        compliant_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{
        ComparisonDifference, ComparisonMatch, MatchType, MissingElement,
    };
    use pretty_assertions::assert_eq;

    fn spec(id: &str, title: &str, category: FindingCategory) -> DocumentSection {
        DocumentSection {
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            start_line: 1,
            end_line: 1,
            level: 1,
            category,
        }
    }

    fn matched(spec_id: &str, score: f64) -> ComparisonMatch {
        ComparisonMatch {
            submittal_section_id: "sub-1".to_string(),
            spec_section_id: spec_id.to_string(),
            match_score: score,
            match_type: MatchType::Exact,
            confidence: score,
        }
    }

    fn row(categories: &[ComplianceCategory], name: FindingCategory) -> &ComplianceCategory {
        categories.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_every_category_present_in_canonical_order() {
        let categories =
            score_categories(&[], &ComparisonDetail::default(), &AnalysisConfig::default());
        let names: Vec<FindingCategory> = categories.iter().map(|c| c.name).collect();
        assert_eq!(names, FindingCategory::ALL.to_vec());
        for c in &categories {
            assert_eq!(c.score, 100);
            assert_eq!(c.status, CategoryStatus::ReviewRequired);
        }
    }

    #[test]
    fn test_matched_item_passes() {
        let sections = vec![spec("spec-1", "1. FIRE RATING", FindingCategory::SafetyRequirements)];
        let detail = ComparisonDetail {
            matches: vec![matched("spec-1", 1.0)],
            ..ComparisonDetail::default()
        };
        let categories = score_categories(&sections, &detail, &AnalysisConfig::default());
        let safety = row(&categories, FindingCategory::SafetyRequirements);
        assert_eq!(safety.items_checked, 1);
        assert_eq!(safety.items_passed, 1);
        assert_eq!(safety.score, 100);
        assert_eq!(safety.status, CategoryStatus::Pass);
    }

    #[test]
    fn test_critical_missing_fails_category() {
        let sections = vec![
            spec("spec-1", "1. FIRE RATING", FindingCategory::SafetyRequirements),
            spec("spec-2", "2. FIRE EXITS", FindingCategory::SafetyRequirements),
        ];
        let detail = ComparisonDetail {
            matches: vec![matched("spec-1", 1.0)],
            missing_elements: vec![MissingElement {
                id: "MISS-001".to_string(),
                spec_section_id: "spec-2".to_string(),
                title: "2. FIRE EXITS".to_string(),
                requirement: "Signs shall be lit.".to_string(),
                category: FindingCategory::SafetyRequirements,
                criticality: Severity::Critical,
                correction_required: true,
            }],
            ..ComparisonDetail::default()
        };
        let categories = score_categories(&sections, &detail, &AnalysisConfig::default());
        let safety = row(&categories, FindingCategory::SafetyRequirements);
        assert_eq!(safety.score, 50);
        assert_eq!(safety.status, CategoryStatus::Fail);
        assert_eq!(safety.critical_failures, vec!["2. FIRE EXITS".to_string()]);
    }

    #[test]
    fn test_correction_required_difference_fails_item() {
        let sections = vec![spec("spec-1", "2. PRODUCTS", FindingCategory::MaterialSpecifications)];
        let detail = ComparisonDetail {
            matches: vec![matched("spec-1", 0.9)],
            differences: vec![ComparisonDifference {
                id: "DIFF-001".to_string(),
                spec_section_id: "spec-1".to_string(),
                submittal_section_id: "sub-1".to_string(),
                submittal_content: String::new(),
                spec_requirement: String::new(),
                severity: Severity::Major,
                category: FindingCategory::MaterialSpecifications,
                impact: "deviation".to_string(),
                correction_required: true,
            }],
            ..ComparisonDetail::default()
        };
        let categories = score_categories(&sections, &detail, &AnalysisConfig::default());
        let material = row(&categories, FindingCategory::MaterialSpecifications);
        assert_eq!(material.items_passed, 0);
        assert_eq!(material.score, 0);
        assert_eq!(material.status, CategoryStatus::Fail);
        assert!(material.critical_failures.is_empty());
    }

    #[test]
    fn test_status_thresholds() {
        let config = AnalysisConfig::default();
        assert_eq!(category_status(80, false, &config), CategoryStatus::Pass);
        assert_eq!(category_status(79, false, &config), CategoryStatus::Conditional);
        assert_eq!(category_status(60, false, &config), CategoryStatus::Conditional);
        assert_eq!(category_status(59, false, &config), CategoryStatus::Fail);
        assert_eq!(category_status(100, true, &config), CategoryStatus::Fail);
    }

    #[test]
    fn test_pass_score_is_configurable() {
        let config = AnalysisConfig {
            compliance_pass_score: 95,
            ..AnalysisConfig::default()
        };
        assert_eq!(category_status(90, false, &config), CategoryStatus::Conditional);
    }

    #[test]
    fn test_weighted_overall_all_unexercised_is_100() {
        let categories: Vec<_> = FindingCategory::ALL
            .into_iter()
            .map(ComplianceCategory::unexercised)
            .collect();
        assert_eq!(weighted_overall(&categories), 100.0);
    }

    #[test]
    fn test_weighted_overall_uses_weights() {
        let mut categories: Vec<_> = FindingCategory::ALL
            .into_iter()
            .map(ComplianceCategory::unexercised)
            .collect();
        // safety (weight 1.0) drops to 0; every other row stays at 100.
        categories[6].score = 0;
        let total: f64 = FindingCategory::ALL.iter().map(|c| c.weight()).sum();
        let expected = ((100.0 * (total - 1.0) / total) * 100.0).round() / 100.0;
        assert_eq!(weighted_overall(&categories), expected);
    }

    #[test]
    fn test_matrix_counts_compliant_items() {
        let sections = vec![
            spec("spec-1", "1. FIRE RATING", FindingCategory::SafetyRequirements),
            spec("spec-2", "2. PRODUCTS", FindingCategory::MaterialSpecifications),
        ];
        let detail = ComparisonDetail {
            matches: vec![matched("spec-1", 1.0), matched("spec-2", 0.5)],
            ..ComparisonDetail::default()
        };
        let matrix =
            build_compliance_matrix(&sections, &detail, &[], &AnalysisConfig::default());
        assert_eq!(matrix.compliant_items, 1);
        assert_eq!(matrix.categories.len(), 10);
        assert_eq!(matrix.critical_issues, 0);
        assert_eq!(matrix.overall_score, 100.0);
    }
}
