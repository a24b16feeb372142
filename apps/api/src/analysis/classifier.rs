//! Section classification: decides which lines open a section and which category a
//! section belongs to.
//!
//! Default: `KeywordSectionClassifier` (regex + keyword tables, deterministic).
//! The engine holds an `Arc<dyn SectionClassifier>`, so a smarter strategy can replace it
//! without touching matching, scoring or assembly.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::categories::FindingCategory;

/// A line recognised as a section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub title: String,
    /// 1–3
    pub level: u8,
}

/// Implement this to swap header detection and categorisation strategies.
pub trait SectionClassifier: Send + Sync {
    /// Short label recorded in report metadata.
    fn name(&self) -> &'static str;

    /// Returns `Some` if the (already trimmed) line opens a new section.
    fn detect_header(&self, line: &str) -> Option<HeaderLine>;

    /// Assigns one of the fixed categories from a section title.
    fn categorize(&self, title: &str) -> FindingCategory;
}

lazy_static! {
    /// "1.", "1.2", "1.2.3" (optional trailing dot), then whitespace and text.
    static ref NUMBERED_HEADING: Regex =
        Regex::new(r"^(?P<num>\d+\.(?:\d+(?:\.\d+)?\.?)?)\s+\S").unwrap();
    static ref HEADING_KEYWORD: Regex = Regex::new(r"\b(?:SECTION|PART|SPECIFICATION)\b").unwrap();
}

/// Keyword/regex classifier.
///
/// Header rules, first hit wins:
/// 1. numbered heading → level = numbering depth
/// 2. ALL-CAPS line (≥ 2 letters, none lowercase) → level 1
/// 3. contains upper-case SECTION / PART / SPECIFICATION → level 1
///
/// Category: first category in canonical order whose keyword appears in the lowercased
/// title, else documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSectionClassifier;

impl SectionClassifier for KeywordSectionClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn detect_header(&self, line: &str) -> Option<HeaderLine> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(caps) = NUMBERED_HEADING.captures(line) {
            let depth = caps["num"].split('.').filter(|part| !part.is_empty()).count();
            return Some(HeaderLine {
                title: line.to_string(),
                level: depth.clamp(1, 3) as u8,
            });
        }

        if is_all_caps(line) || HEADING_KEYWORD.is_match(line) {
            return Some(HeaderLine {
                title: line.to_string(),
                level: 1,
            });
        }

        None
    }

    fn categorize(&self, title: &str) -> FindingCategory {
        let title_lower = title.to_lowercase();
        FindingCategory::ALL
            .into_iter()
            .find(|category| {
                category
                    .title_keywords()
                    .iter()
                    .any(|keyword| title_lower.contains(keyword))
            })
            .unwrap_or(FindingCategory::Documentation)
    }
}

fn is_all_caps(line: &str) -> bool {
    let mut letters = 0usize;
    for c in line.chars().filter(|c| c.is_alphabetic()) {
        if c.is_lowercase() {
            return false;
        }
        letters += 1;
    }
    letters >= 2
}
