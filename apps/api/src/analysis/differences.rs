//! Difference analysis: turns accepted matches into concrete discrepancies and sorts the
//! unmatched sections on each side into missing and excess elements.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::analysis::categories::FindingCategory;
use crate::analysis::error::AnalysisError;
use crate::analysis::matcher::MatchOutcome;
use crate::analysis::models::{
    ComparisonDetail, ComparisonDifference, ComparisonMatch, DocumentSection, ExcessAction,
    ExcessElement, Relevance, Severity,
};
use crate::config::AnalysisConfig;

/// Phrases a submittal uses when it departs from what was specified.
const DEVIATION_MARKERS: &[&str] = &[
    "substitut",
    "alternate",
    "in lieu of",
    "deviation",
    "exception",
    "not provided",
    "not included",
    "by others",
];

/// Words that make a requirement mandatory.
const MANDATORY_WORDS: &[&str] = &["shall", "must", "required"];

const EXCERPT_CHARS: usize = 200;

lazy_static! {
    static ref NUMERIC_VALUE: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// Output of the difference stage: the comparison detail plus its overall confidence.
#[derive(Debug, Clone)]
pub struct DifferenceReport {
    pub detail: ComparisonDetail,
    pub confidence: f64,
}

/// Runs the difference rules over every accepted match and classifies leftovers.
///
/// Fails only if a match references a section id that is not in either list.
pub fn analyze_differences(
    spec_sections: &[DocumentSection],
    submittal_sections: &[DocumentSection],
    outcome: MatchOutcome,
    config: &AnalysisConfig,
) -> Result<DifferenceReport, AnalysisError> {
    let spec_by_id: HashMap<&str, &DocumentSection> =
        spec_sections.iter().map(|s| (s.id.as_str(), s)).collect();
    let submittal_by_id: HashMap<&str, &DocumentSection> =
        submittal_sections.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut differences = Vec::new();
    for m in &outcome.matches {
        let spec = spec_by_id
            .get(m.spec_section_id.as_str())
            .ok_or_else(|| AnalysisError::UnknownSection(m.spec_section_id.clone()))?;
        let submittal = submittal_by_id
            .get(m.submittal_section_id.as_str())
            .ok_or_else(|| AnalysisError::UnknownSection(m.submittal_section_id.clone()))?;

        for mut difference in compare_pair(spec, submittal, m, config) {
            difference.id = format!("DIFF-{:03}", differences.len() + 1);
            differences.push(difference);
        }
    }

    let matched_submittals: HashSet<&str> = outcome
        .matches
        .iter()
        .map(|m| m.submittal_section_id.as_str())
        .collect();

    let excess_elements: Vec<ExcessElement> = submittal_sections
        .iter()
        .filter(|s| !matched_submittals.contains(s.id.as_str()))
        .enumerate()
        .map(|(idx, section)| {
            let (relevance, action) = classify_excess(section);
            ExcessElement {
                id: format!("EXC-{:03}", idx + 1),
                submittal_section_id: section.id.clone(),
                title: section.display_title().to_string(),
                content: excerpt(&section.body),
                category: section.category,
                relevance,
                action,
            }
        })
        .collect();

    let confidence = comparison_confidence(&outcome.matches, differences.len());

    debug!(
        "Found {} difference(s), {} missing, {} excess; confidence {:.2}",
        differences.len(),
        outcome.missing_elements.len(),
        excess_elements.len(),
        confidence
    );

    Ok(DifferenceReport {
        detail: ComparisonDetail {
            matches: outcome.matches,
            differences,
            missing_elements: outcome.missing_elements,
            excess_elements,
        },
        confidence,
    })
}

/// Applies the three difference rules to one matched pair. Ids are assigned by the caller.
///
/// 1. numeric values in the requirement that the submittal never states
/// 2. deviation language in the submittal
/// 3. a low-confidence match against a mandatory requirement
fn compare_pair(
    spec: &DocumentSection,
    submittal: &DocumentSection,
    m: &ComparisonMatch,
    config: &AnalysisConfig,
) -> Vec<ComparisonDifference> {
    let mut differences = Vec::new();
    let submittal_lower = submittal.body.to_lowercase();
    let spec_lower = spec.body.to_lowercase();

    let stated: HashSet<&str> = NUMERIC_VALUE
        .find_iter(&submittal.body)
        .map(|v| v.as_str())
        .collect();
    let mut unstated: Vec<&str> = Vec::new();
    for value in NUMERIC_VALUE.find_iter(&spec.body).map(|v| v.as_str()) {
        if !stated.contains(value) && !unstated.contains(&value) {
            unstated.push(value);
        }
    }
    if !unstated.is_empty() {
        let severity = match spec.category {
            FindingCategory::SafetyRequirements | FindingCategory::RegulatoryCompliance => {
                Severity::Critical
            }
            _ => Severity::Major,
        };
        differences.push(difference(
            spec,
            submittal,
            severity,
            format!(
                "Specified value(s) {} for '{}' not found in submittal section '{}'",
                unstated.join(", "),
                spec.display_title(),
                submittal.display_title()
            ),
            true,
        ));
    }

    if let Some(marker) = DEVIATION_MARKERS
        .iter()
        .find(|marker| submittal_lower.contains(*marker))
    {
        differences.push(difference(
            spec,
            submittal,
            Severity::Major,
            format!(
                "Submittal content is inconsistent with '{}': declares a deviation ('{}')",
                spec.display_title(),
                marker
            ),
            true,
        ));
    }

    let mandatory = MANDATORY_WORDS.iter().any(|w| spec_lower.contains(w));
    if mandatory && m.confidence < config.confidence_threshold {
        let severity = if config.strict_mode {
            Severity::Major
        } else {
            Severity::Minor
        };
        differences.push(difference(
            spec,
            submittal,
            severity,
            format!(
                "Submittal section '{}' only loosely addresses mandatory requirement '{}' (confidence {:.2})",
                submittal.display_title(),
                spec.display_title(),
                m.confidence
            ),
            config.strict_mode,
        ));
    }

    differences
}

fn difference(
    spec: &DocumentSection,
    submittal: &DocumentSection,
    severity: Severity,
    impact: String,
    correction_required: bool,
) -> ComparisonDifference {
    ComparisonDifference {
        id: String::new(),
        spec_section_id: spec.id.clone(),
        submittal_section_id: submittal.id.clone(),
        submittal_content: excerpt(&submittal.body),
        spec_requirement: excerpt(&spec.body),
        severity,
        category: spec.category,
        impact,
        correction_required,
    }
}

/// Empty sections are noise, categorised content is relevant, everything else needs a question.
pub fn classify_excess(section: &DocumentSection) -> (Relevance, ExcessAction) {
    if section.body.trim().is_empty() {
        (Relevance::Irrelevant, ExcessAction::Remove)
    } else if section.category != FindingCategory::Documentation {
        (Relevance::Relevant, ExcessAction::Accept)
    } else {
        (Relevance::Unclear, ExcessAction::Clarify)
    }
}

/// mean(match score) − min(0.5, 0.1 × differences), floored at 0.1.
pub fn comparison_confidence(matches: &[ComparisonMatch], difference_count: usize) -> f64 {
    let mean = if matches.is_empty() {
        0.0
    } else {
        matches.iter().map(|m| m.match_score).sum::<f64>() / matches.len() as f64
    };
    let penalty = (0.1 * difference_count as f64).min(0.5);
    (mean - penalty).clamp(0.1, 1.0)
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
