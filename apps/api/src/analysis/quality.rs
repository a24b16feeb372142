//! Quality metrics: six 0–100 sub-scores and their unweighted mean.

use crate::analysis::categories::FindingCategory;
use crate::analysis::findings::severity_counts;
use crate::analysis::models::{DetailedFinding, QualityMetrics};

/// Metrics below this are listed as improvement areas.
pub const IMPROVEMENT_THRESHOLD: f64 = 70.0;

/// Names of the metrics below `IMPROVEMENT_THRESHOLD`, in field order.
pub fn improvement_areas(metrics: &QualityMetrics) -> Vec<String> {
    [
        ("documentation_quality", metrics.documentation_quality),
        ("technical_accuracy", metrics.technical_accuracy),
        ("completeness", metrics.completeness),
        ("clarity", metrics.clarity),
        ("consistency", metrics.consistency),
        ("compliance_readiness", metrics.compliance_readiness),
    ]
    .into_iter()
    .filter(|(_, value)| *value < IMPROVEMENT_THRESHOLD)
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Findings that count against consistency: documentation findings and anything whose
/// description flags an inconsistency.
fn is_consistency_issue(finding: &DetailedFinding) -> bool {
    finding.category == FindingCategory::Documentation
        || finding.description.to_lowercase().contains("inconsistent")
}

pub fn compute_quality_metrics(
    findings: &[DetailedFinding],
    submittal_section_count: usize,
    spec_section_count: usize,
) -> QualityMetrics {
    let (critical, major, _) = severity_counts(findings);
    let (critical, major) = (critical as f64, major as f64);
    let finding_count = findings.len() as f64;
    let consistency_issues = findings.iter().filter(|f| is_consistency_issue(f)).count() as f64;

    let documentation_quality = (100.0 - 20.0 * critical - 10.0 * major).max(0.0);
    let technical_accuracy = (100.0 - 15.0 * critical - 8.0 * major).max(0.0);
    let completeness = if spec_section_count == 0 {
        100.0
    } else {
        (submittal_section_count as f64 / spec_section_count as f64 * 100.0).min(100.0)
    };
    let clarity = (100.0 - 5.0 * finding_count).clamp(50.0, 100.0);
    let consistency = (100.0 - 10.0 * consistency_issues).max(0.0);
    let compliance_readiness = 0.6 * documentation_quality + 0.4 * technical_accuracy;
    let overall_quality = (documentation_quality
        + technical_accuracy
        + completeness
        + clarity
        + consistency
        + compliance_readiness)
        / 6.0;

    let mut metrics = QualityMetrics {
        documentation_quality,
        technical_accuracy,
        completeness,
        clarity,
        consistency,
        compliance_readiness,
        overall_quality,
        improvement_areas: Vec::new(),
    };
    metrics.improvement_areas = improvement_areas(&metrics);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{FindingSource, FindingStatus, Level, Severity, Urgency};

    fn finding(severity: Severity, category: FindingCategory, description: &str) -> DetailedFinding {
        DetailedFinding {
            id: "F-001".to_string(),
            source: FindingSource::Difference,
            title: String::new(),
            description: description.to_string(),
            severity,
            category,
            impact: Level::Low,
            urgency: Urgency::Routine,
            effort: Level::Low,
            risk_level: Level::Low,
            compliance_status: FindingStatus::NonCompliant,
            corrective_action: String::new(),
            timeline: String::new(),
            responsible_party: String::new(),
            location: String::new(),
            related_findings: vec![],
        }
    }

    #[test]
    fn test_clean_submittal_scores_100_everywhere() {
        let m = compute_quality_metrics(&[], 3, 3);
        assert_eq!(m.documentation_quality, 100.0);
        assert_eq!(m.technical_accuracy, 100.0);
        assert_eq!(m.completeness, 100.0);
        assert_eq!(m.clarity, 100.0);
        assert_eq!(m.consistency, 100.0);
        assert_eq!(m.compliance_readiness, 100.0);
        assert_eq!(m.overall_quality, 100.0);
        assert!(m.improvement_areas.is_empty());
    }

    #[test]
    fn test_severity_penalties() {
        let findings = vec![
            finding(Severity::Critical, FindingCategory::SafetyRequirements, "x"),
            finding(Severity::Major, FindingCategory::MaterialSpecifications, "y"),
        ];
        let m = compute_quality_metrics(&findings, 2, 2);
        assert_eq!(m.documentation_quality, 70.0);
        assert_eq!(m.technical_accuracy, 77.0);
        assert_eq!(m.clarity, 90.0);
        assert!((m.compliance_readiness - (0.6 * 70.0 + 0.4 * 77.0)).abs() < 1e-9);
    }

    #[test]
    fn test_penalties_floor_at_zero() {
        let findings = vec![finding(Severity::Critical, FindingCategory::SafetyRequirements, "x"); 10];
        let m = compute_quality_metrics(&findings, 1, 1);
        assert_eq!(m.documentation_quality, 0.0);
        assert_eq!(m.technical_accuracy, 0.0);
        assert_eq!(m.clarity, 50.0);
    }

    #[test]
    fn test_completeness_ratio_and_cap() {
        assert!((compute_quality_metrics(&[], 2, 5).completeness - 40.0).abs() < 1e-9);
        assert_eq!(compute_quality_metrics(&[], 8, 5).completeness, 100.0);
    }

    #[test]
    fn test_consistency_counts_documentation_and_inconsistent() {
        let findings = vec![
            finding(Severity::Minor, FindingCategory::Documentation, "unreferenced"),
            finding(
                Severity::Major,
                FindingCategory::MaterialSpecifications,
                "Submittal content is inconsistent with '2. PRODUCTS'",
            ),
            finding(Severity::Minor, FindingCategory::QualityControl, "other"),
        ];
        let m = compute_quality_metrics(&findings, 1, 1);
        assert_eq!(m.consistency, 80.0);
    }

    #[test]
    fn test_improvement_areas_below_70() {
        let m = compute_quality_metrics(&[], 2, 5);
        assert_eq!(m.improvement_areas, vec!["completeness".to_string()]);
    }
}
