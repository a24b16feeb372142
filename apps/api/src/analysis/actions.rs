//! Action items: at most three prioritised, dated work items covering the findings.

use chrono::{DateTime, Duration, Utc};

use crate::analysis::models::{ActionItem, DetailedFinding, Level, Severity};

const CRITICAL_DUE_DAYS: i64 = 7;
const MAJOR_DUE_DAYS: i64 = 14;
const REVIEW_DUE_DAYS: i64 = 21;

const HOURS_PER_CRITICAL: f64 = 4.0;
const HOURS_PER_MAJOR: f64 = 2.0;
const REVIEW_HOURS: f64 = 8.0;

fn ids_with_severity(findings: &[DetailedFinding], severity: Severity) -> Vec<String> {
    findings
        .iter()
        .filter(|f| f.severity == severity)
        .map(|f| f.id.clone())
        .collect()
}

/// Generates up to three action items, due relative to `requested_at`:
/// 1. critical findings → 7 days, 4h each
/// 2. major findings → 14 days, 2h each, after item 1 when present
/// 3. any findings → fixed 8h quality review, 21 days
pub fn generate_action_items(
    findings: &[DetailedFinding],
    requested_at: DateTime<Utc>,
) -> Vec<ActionItem> {
    let due = |days: i64| (requested_at + Duration::days(days)).date_naive();
    let mut items: Vec<ActionItem> = Vec::new();

    let critical = ids_with_severity(findings, Severity::Critical);
    let major = ids_with_severity(findings, Severity::Major);

    if !critical.is_empty() {
        items.push(ActionItem {
            id: "ACT-001".to_string(),
            title: "Resolve Critical Compliance Issues".to_string(),
            description: format!(
                "Correct {} critical finding(s) that block approval of the submittal",
                critical.len()
            ),
            priority: Level::Critical,
            assignee: "Design Team Lead".to_string(),
            due_date: due(CRITICAL_DUE_DAYS),
            estimated_hours: HOURS_PER_CRITICAL * critical.len() as f64,
            dependencies: Vec::new(),
            related_findings: critical,
        });
    }

    if !major.is_empty() {
        let dependencies = items.iter().map(|i| i.id.clone()).collect();
        items.push(ActionItem {
            id: format!("ACT-{:03}", items.len() + 1),
            title: "Address Major Discrepancies".to_string(),
            description: format!(
                "Revise the submittal to resolve {} major discrepancy(ies)",
                major.len()
            ),
            priority: Level::High,
            assignee: "Design Team".to_string(),
            due_date: due(MAJOR_DUE_DAYS),
            estimated_hours: HOURS_PER_MAJOR * major.len() as f64,
            dependencies,
            related_findings: major,
        });
    }

    if !findings.is_empty() {
        items.push(ActionItem {
            id: format!("ACT-{:03}", items.len() + 1),
            title: "Quality Review and Documentation".to_string(),
            description: "Review the corrected submittal end to end and update the project record"
                .to_string(),
            priority: Level::Medium,
            assignee: "Quality Reviewer".to_string(),
            due_date: due(REVIEW_DUE_DAYS),
            estimated_hours: REVIEW_HOURS,
            dependencies: Vec::new(),
            related_findings: findings.iter().map(|f| f.id.clone()).collect(),
        });
    }

    items
}
