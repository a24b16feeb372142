//! Detailed findings: one per difference, per missing requirement and per excess section
//! that needs follow-up. Ids are deterministic (`F-001`, …) so identical inputs yield
//! identical findings.

use crate::analysis::categories::FindingCategory;
use crate::analysis::models::{
    ComparisonDetail, DetailedFinding, DocumentSection, ExcessAction, Finding, FindingSource,
    FindingStatus, Level, Severity, Urgency,
};

/// Severity-driven attributes shared by every finding source.
struct SeverityProfile {
    impact: Level,
    urgency: Urgency,
    effort: Level,
    risk_level: Level,
    timeline: &'static str,
    responsible_party: &'static str,
}

fn profile(severity: Severity) -> SeverityProfile {
    match severity {
        Severity::Critical => SeverityProfile {
            impact: Level::High,
            urgency: Urgency::Immediate,
            effort: Level::Medium,
            risk_level: Level::High,
            timeline: "Immediate (1-3 days)",
            responsible_party: "Design Team Lead",
        },
        Severity::Major => SeverityProfile {
            impact: Level::Medium,
            urgency: Urgency::Soon,
            effort: Level::Medium,
            risk_level: Level::Medium,
            timeline: "1-2 weeks",
            responsible_party: "Design Team",
        },
        Severity::Minor => SeverityProfile {
            impact: Level::Low,
            urgency: Urgency::Routine,
            effort: Level::Low,
            risk_level: Level::Low,
            timeline: "Next submittal",
            responsible_party: "Contractor",
        },
    }
}

struct FindingDraft {
    source: FindingSource,
    title: String,
    description: String,
    severity: Severity,
    category: FindingCategory,
    status: FindingStatus,
    corrective_action: String,
    location: String,
}

/// Builds detailed findings in a fixed order: differences, missing elements, then excess
/// elements whose action is not `accept`. Related findings are the others in the same category.
pub fn build_detailed_findings(
    detail: &ComparisonDetail,
    spec_sections: &[DocumentSection],
) -> Vec<DetailedFinding> {
    let spec_title = |id: &str| {
        spec_sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.display_title().to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let mut drafts: Vec<FindingDraft> = Vec::new();

    for diff in &detail.differences {
        let (status, corrective_action) = if diff.correction_required {
            (
                FindingStatus::NonCompliant,
                format!(
                    "Revise submittal section {} to meet the specified requirement",
                    diff.submittal_section_id
                ),
            )
        } else {
            (
                FindingStatus::PartiallyCompliant,
                format!(
                    "Confirm submittal section {} satisfies the requirement",
                    diff.submittal_section_id
                ),
            )
        };
        drafts.push(FindingDraft {
            source: FindingSource::Difference,
            title: format!("Discrepancy in {}", spec_title(&diff.spec_section_id)),
            description: diff.impact.clone(),
            severity: diff.severity,
            category: diff.category,
            status,
            corrective_action,
            location: diff.spec_section_id.clone(),
        });
    }

    for missing in &detail.missing_elements {
        drafts.push(FindingDraft {
            source: FindingSource::MissingElement,
            title: format!("Missing requirement: {}", missing.title),
            description: format!(
                "No submittal content addresses specification section '{}'",
                missing.title
            ),
            severity: missing.criticality,
            category: missing.category,
            status: FindingStatus::NonCompliant,
            corrective_action: format!(
                "Provide documentation demonstrating compliance with '{}'",
                missing.title
            ),
            location: missing.spec_section_id.clone(),
        });
    }

    for excess in detail
        .excess_elements
        .iter()
        .filter(|e| e.action != ExcessAction::Accept)
    {
        let corrective_action = if excess.action == ExcessAction::Remove {
            format!("Remove empty section '{}' from the submittal", excess.title)
        } else {
            format!("Clarify how '{}' relates to the specification", excess.title)
        };
        drafts.push(FindingDraft {
            source: FindingSource::ExcessElement,
            title: format!("Unreferenced submittal content: {}", excess.title),
            description: format!(
                "Submittal section '{}' does not correspond to any specification requirement",
                excess.title
            ),
            severity: Severity::Minor,
            category: excess.category,
            status: FindingStatus::RequiresClarification,
            corrective_action,
            location: excess.submittal_section_id.clone(),
        });
    }

    let ids: Vec<String> = (1..=drafts.len()).map(|n| format!("F-{n:03}")).collect();
    let categories: Vec<FindingCategory> = drafts.iter().map(|d| d.category).collect();

    drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| {
            let related_findings = ids
                .iter()
                .zip(&categories)
                .enumerate()
                .filter(|(other, (_, category))| *other != idx && **category == draft.category)
                .map(|(_, (id, _))| id.clone())
                .collect();
            let p = profile(draft.severity);
            DetailedFinding {
                id: ids[idx].clone(),
                source: draft.source,
                title: draft.title,
                description: draft.description,
                severity: draft.severity,
                category: draft.category,
                impact: p.impact,
                urgency: p.urgency,
                effort: p.effort,
                risk_level: p.risk_level,
                compliance_status: draft.status,
                corrective_action: draft.corrective_action,
                timeline: p.timeline.to_string(),
                responsible_party: p.responsible_party.to_string(),
                location: draft.location,
                related_findings,
            }
        })
        .collect()
}

/// Flattens detailed findings into the legacy finding shape.
pub fn legacy_findings(detailed: &[DetailedFinding]) -> Vec<Finding> {
    detailed
        .iter()
        .map(|f| Finding {
            id: f.id.clone(),
            severity: f.severity,
            category: f.category,
            description: f.description.clone(),
            location: f.location.clone(),
            recommendation: f.corrective_action.clone(),
        })
        .collect()
}

/// (critical, major, minor)
pub fn severity_counts(findings: &[DetailedFinding]) -> (usize, usize, usize) {
    findings
        .iter()
        .fold((0, 0, 0), |(critical, major, minor), f| match f.severity {
            Severity::Critical => (critical + 1, major, minor),
            Severity::Major => (critical, major + 1, minor),
            Severity::Minor => (critical, major, minor + 1),
        })
}
