//! Section extraction: splits plain document text into titled, categorised sections.

use tracing::debug;

use crate::analysis::classifier::SectionClassifier;
use crate::analysis::models::DocumentSection;

/// Title given to text that appears before the first detected header.
pub const PREAMBLE_TITLE: &str = "Preamble";

struct SectionDraft {
    title: String,
    level: u8,
    start_line: usize,
    end_line: usize,
    body_lines: Vec<String>,
}

impl SectionDraft {
    fn new(title: String, level: u8, line_no: usize) -> Self {
        Self {
            title,
            level,
            start_line: line_no,
            end_line: line_no,
            body_lines: Vec::new(),
        }
    }
}

/// Extracts sections from `text`. Ids are `{id_prefix}-1`, `{id_prefix}-2`, …
///
/// - Every header yields a section, even when no body follows it.
/// - Blank lines are dropped; body lines are trimmed and joined with `\n`.
/// - Text before the first header becomes a `Preamble` section.
/// - Text without any header (including empty text) yields exactly one untitled section.
pub fn extract_sections(
    text: &str,
    id_prefix: &str,
    classifier: &dyn SectionClassifier,
) -> Vec<DocumentSection> {
    let mut drafts: Vec<SectionDraft> = Vec::new();
    let mut current: Option<SectionDraft> = None;
    let mut preamble: Option<SectionDraft> = None;
    let mut line_count = 0usize;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        line_count = line_no;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = classifier.detect_header(line) {
            if let Some(done) = current.take() {
                drafts.push(done);
            }
            current = Some(SectionDraft::new(header.title, header.level, line_no));
            continue;
        }

        let target = match current.as_mut() {
            Some(section) => section,
            None => preamble
                .get_or_insert_with(|| SectionDraft::new(String::new(), 1, line_no)),
        };
        target.body_lines.push(line.to_string());
        target.end_line = line_no;
    }

    if let Some(done) = current.take() {
        drafts.push(done);
    }

    if drafts.is_empty() {
        // No headers: a single section covering all content.
        let mut whole =
            preamble.unwrap_or_else(|| SectionDraft::new(String::new(), 1, 1));
        whole.start_line = 1;
        whole.end_line = line_count.max(1);
        drafts.push(whole);
    } else if let Some(mut lead) = preamble {
        lead.title = PREAMBLE_TITLE.to_string();
        drafts.insert(0, lead);
    }

    let sections: Vec<DocumentSection> = drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| DocumentSection {
            id: format!("{}-{}", id_prefix, idx + 1),
            category: classifier.categorize(&draft.title),
            title: draft.title,
            body: draft.body_lines.join("\n"),
            start_line: draft.start_line,
            end_line: draft.end_line,
            level: draft.level,
        })
        .collect();

    debug!(
        "Extracted {} section(s) from {} line(s) with prefix '{}'",
        sections.len(),
        line_count,
        id_prefix
    );

    sections
}
