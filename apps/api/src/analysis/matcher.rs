//! Section matching: pairs specification sections with submittal sections by literal
//! token overlap (Jaccard similarity over lowercase whitespace-split word sets).

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::analysis::models::{
    ComparisonMatch, DocumentSection, MatchType, MissingElement, Severity,
};
use crate::config::AnalysisConfig;

/// Body words that make an unmatched requirement critical rather than major.
pub const CRITICAL_KEYWORDS: &[&str] = &["safety", "structural", "fire", "code", "required", "shall"];

const EXACT_MATCH_SCORE: f64 = 0.8;
const PARTIAL_MATCH_SCORE: f64 = 0.6;

lazy_static! {
    static ref NUMBERING_TOKEN: Regex = Regex::new(r"^\d+(?:\.\d+)*\.?$").unwrap();
}

/// Accepted matches (best first) plus the specification sections nothing matched.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matches: Vec<ComparisonMatch>,
    pub missing_elements: Vec<MissingElement>,
}

pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Title tokens without the leading numbering token ("1.", "2.3").
pub fn title_tokens(title: &str) -> HashSet<String> {
    let mut words = title.split_whitespace().peekable();
    if words
        .peek()
        .map(|first| NUMBERING_TOKEN.is_match(first))
        .unwrap_or(false)
    {
        words.next();
    }
    words.map(|t| t.to_lowercase()).collect()
}

/// |A ∩ B| / |A ∪ B|; 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Overlap of the section contents alone. Used as match confidence, so a shared heading
/// never vouches for what the body says.
pub fn body_similarity(spec: &DocumentSection, submittal: &DocumentSection) -> f64 {
    jaccard(&tokenize(&spec.body), &tokenize(&submittal.body))
}

/// Higher of title overlap and body overlap.
pub fn section_similarity(spec: &DocumentSection, submittal: &DocumentSection) -> f64 {
    let title_score = jaccard(&title_tokens(&spec.title), &title_tokens(&submittal.title));
    title_score.max(body_similarity(spec, submittal))
}

pub fn classify_match(score: f64) -> MatchType {
    if score > EXACT_MATCH_SCORE {
        MatchType::Exact
    } else if score > PARTIAL_MATCH_SCORE {
        MatchType::Partial
    } else {
        MatchType::Semantic
    }
}

/// Critical if the requirement body uses any safety/code/mandatory keyword, else major.
pub fn missing_criticality(body: &str) -> Severity {
    let body_lower = body.to_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|k| body_lower.contains(k)) {
        Severity::Critical
    } else {
        Severity::Major
    }
}

/// Scores every (spec, submittal) pair and keeps those above `config.match_threshold`.
///
/// Several submittal sections may match one specification section; all are kept and the
/// full list is sorted by descending score (ties keep document order).
pub fn match_sections(
    spec_sections: &[DocumentSection],
    submittal_sections: &[DocumentSection],
    config: &AnalysisConfig,
) -> MatchOutcome {
    let mut matches = Vec::new();
    let mut missing_elements = Vec::new();

    for spec in spec_sections {
        let mut accepted = 0usize;
        for submittal in submittal_sections {
            let score = section_similarity(spec, submittal);
            if score > config.match_threshold {
                accepted += 1;
                matches.push(ComparisonMatch {
                    submittal_section_id: submittal.id.clone(),
                    spec_section_id: spec.id.clone(),
                    match_score: score,
                    match_type: classify_match(score),
                    confidence: body_similarity(spec, submittal),
                });
            }
        }

        if accepted == 0 {
            missing_elements.push(MissingElement {
                id: format!("MISS-{:03}", missing_elements.len() + 1),
                spec_section_id: spec.id.clone(),
                title: spec.display_title().to_string(),
                requirement: spec.body.clone(),
                category: spec.category,
                criticality: missing_criticality(&spec.body),
                correction_required: true,
            });
        }
    }

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        "Matched {} pair(s); {} specification section(s) unmatched",
        matches.len(),
        missing_elements.len()
    );

    MatchOutcome {
        matches,
        missing_elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::categories::FindingCategory;

    fn section(id: &str, title: &str, body: &str) -> DocumentSection {
        DocumentSection {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            start_line: 1,
            end_line: 1,
            level: 1,
            category: FindingCategory::Documentation,
        }
    }

    #[test]
    fn test_jaccard_identical_sets() {
        let a = tokenize("steel door frame");
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = tokenize("steel door frame");
        let b = tokenize("steel door hinge");
        // {steel, door} / {steel, door, frame, hinge}
        assert!((jaccard(&a, &b) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_is_case_insensitive() {
        assert!((jaccard(&tokenize("Steel DOOR"), &tokenize("steel door")) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        assert_eq!(jaccard(&HashSet::new(), &tokenize("steel")), 0.0);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_title_tokens_drop_numbering() {
        let tokens = title_tokens("1.2 FIRE RATING");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("fire"));
        assert!(!tokens.contains("1.2"));
    }

    #[test]
    fn test_identical_titles_score_one() {
        let spec = section("spec-1", "1. FIRE RATING", "Door shall have 90 minute fire rating.");
        let sub = section(
            "sub-1",
            "1. FIRE RATING",
            "Door has 90 minute fire rating. UL Listed.",
        );
        assert!((section_similarity(&spec, &sub) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_confidence_follows_body_not_title() {
        let spec = vec![section(
            "spec-1",
            "1. FINISH",
            "Finish shall be factory primed gray enamel.",
        )];
        let sub = vec![section("sub-1", "1. FINISH", "Stainless steel, brushed.")];
        let outcome = match_sections(&spec, &sub, &AnalysisConfig::default());
        assert_eq!(outcome.matches.len(), 1);
        assert!((outcome.matches[0].match_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(outcome.matches[0].confidence, 0.0);
    }

    #[test]
    fn test_classify_match_thresholds() {
        assert_eq!(classify_match(0.95), MatchType::Exact);
        assert_eq!(classify_match(0.8), MatchType::Partial);
        assert_eq!(classify_match(0.61), MatchType::Partial);
        assert_eq!(classify_match(0.6), MatchType::Semantic);
        assert_eq!(classify_match(0.31), MatchType::Semantic);
    }

    #[test]
    fn test_missing_criticality_keywords() {
        assert_eq!(missing_criticality("Door SHALL be labeled."), Severity::Critical);
        assert_eq!(missing_criticality("Structural steel per AISC."), Severity::Critical);
        assert_eq!(missing_criticality("Provide color samples."), Severity::Major);
    }

    #[test]
    fn test_threshold_is_strict() {
        // {alpha, beta} vs {alpha, gamma} = 1/3, not strictly above a 1/3 threshold
        let spec = vec![section("spec-1", "", "alpha beta")];
        let sub = vec![section("sub-1", "", "alpha gamma")];
        let config = AnalysisConfig {
            match_threshold: 1.0 / 3.0,
            ..AnalysisConfig::default()
        };
        let outcome = match_sections(&spec, &sub, &config);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.missing_elements.len(), 1);
    }

    #[test]
    fn test_unmatched_spec_becomes_missing_element() {
        let spec = vec![
            section("spec-1", "1. FIRE RATING", "Door shall have 90 minute fire rating."),
            section("spec-2", "2. FINISH", "Provide factory primer."),
        ];
        let sub = vec![section("sub-1", "1. FIRE RATING", "Door has 90 minute rating.")];
        let outcome = match_sections(&spec, &sub, &AnalysisConfig::default());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.missing_elements.len(), 1);
        let missing = &outcome.missing_elements[0];
        assert_eq!(missing.id, "MISS-001");
        assert_eq!(missing.spec_section_id, "spec-2");
        assert_eq!(missing.criticality, Severity::Major);
        assert!(missing.correction_required);
    }

    #[test]
    fn test_matches_sorted_descending() {
        let spec = vec![section("spec-1", "", "steel door frame hinge")];
        let sub = vec![
            section("sub-1", "", "steel door"),
            section("sub-2", "", "steel door frame hinge"),
        ];
        let outcome = match_sections(&spec, &sub, &AnalysisConfig::default());
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].submittal_section_id, "sub-2");
        assert!(outcome.matches[0].match_score >= outcome.matches[1].match_score);
        assert_eq!(outcome.matches[0].match_type, MatchType::Exact);
        assert_eq!(outcome.matches[1].match_type, MatchType::Semantic);
    }
}
