//! Data model shared by every stage of the comparison pipeline.
//!
//! All values are created fresh per analysis and owned by the `AnalysisResult` that
//! carries them out of the engine. Nothing here holds state across requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::categories::FindingCategory;

// ────────────────────────────────────────────────────────────────────────────
// Shared enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

/// Four-step scale used for impact, effort, probability, risk and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Immediate,
    Soon,
    Routine,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections and matches
// ────────────────────────────────────────────────────────────────────────────

/// A titled, categorised run of lines from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub id: String,
    /// Full header line as written; empty for the single fallback section of header-less text.
    pub title: String,
    pub body: String,
    pub start_line: usize,
    pub end_line: usize,
    /// 1–3, from numbering depth.
    pub level: u8,
    pub category: FindingCategory,
}

impl DocumentSection {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled section"
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Partial,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatch {
    pub submittal_section_id: String,
    pub spec_section_id: String,
    pub match_score: f64, // 0.0 – 1.0
    pub match_type: MatchType,
    pub confidence: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Comparison outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDifference {
    pub id: String,
    pub spec_section_id: String,
    pub submittal_section_id: String,
    pub submittal_content: String,
    pub spec_requirement: String,
    pub severity: Severity,
    pub category: FindingCategory,
    pub impact: String,
    pub correction_required: bool,
}

/// A specification requirement with no accepted submittal match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingElement {
    pub id: String,
    pub spec_section_id: String,
    pub title: String,
    pub requirement: String,
    pub category: FindingCategory,
    /// Only `Critical` or `Major`.
    pub criticality: Severity,
    pub correction_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Relevant,
    Irrelevant,
    Unclear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcessAction {
    Accept,
    Clarify,
    Remove,
}

/// Submittal content that no specification section asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcessElement {
    pub id: String,
    pub submittal_section_id: String,
    pub title: String,
    pub content: String,
    pub category: FindingCategory,
    pub relevance: Relevance,
    pub action: ExcessAction,
}

/// Everything the matcher and difference analyzer produced, kept on the result for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDetail {
    pub matches: Vec<ComparisonMatch>,
    pub differences: Vec<ComparisonDifference>,
    pub missing_elements: Vec<MissingElement>,
    pub excess_elements: Vec<ExcessElement>,
}

// ────────────────────────────────────────────────────────────────────────────
// Compliance matrix
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryStatus {
    Pass,
    Fail,
    Conditional,
    ReviewRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCategory {
    pub name: FindingCategory,
    pub score: u32, // 0 – 100
    pub weight: f64,
    pub status: CategoryStatus,
    pub items_checked: usize,
    pub items_passed: usize,
    pub critical_failures: Vec<String>,
}

impl ComplianceCategory {
    /// Row for a category no specification section exercised. Scores 100 so it never
    /// pulls the weighted overall score down.
    pub fn unexercised(name: FindingCategory) -> Self {
        Self {
            name,
            score: 100,
            weight: name.weight(),
            status: CategoryStatus::ReviewRequired,
            items_checked: 0,
            items_passed: 0,
            critical_failures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMatrix {
    pub overall_score: f64, // 0 – 100
    pub categories: Vec<ComplianceCategory>,
    pub summary: String,
    pub critical_issues: usize,
    pub major_issues: usize,
    pub minor_issues: usize,
    pub compliant_items: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Findings
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    Difference,
    MissingElement,
    ExcessElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingStatus {
    NonCompliant,
    PartiallyCompliant,
    RequiresClarification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedFinding {
    pub id: String,
    pub source: FindingSource,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: FindingCategory,
    pub impact: Level,
    pub urgency: Urgency,
    pub effort: Level,
    pub risk_level: Level,
    pub compliance_status: FindingStatus,
    pub corrective_action: String,
    pub timeline: String,
    pub responsible_party: String,
    /// Section id the finding points at (specification side for differences and missing elements).
    pub location: String,
    pub related_findings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Risk, quality, actions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: String,
    pub description: String,
    pub probability: Level,
    pub impact: Level,
    pub risk_score: u8, // 0 – 10
    pub mitigation_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationStrategy {
    pub risk_category: String,
    pub strategy: String,
    pub effort: Level,
    pub timeline: String,
    pub responsible_party: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk: Level,
    pub risk_factors: Vec<RiskFactor>,
    pub mitigation_strategies: Vec<MitigationStrategy>,
    pub residual_risk: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub documentation_quality: f64,
    pub technical_accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub consistency: f64,
    pub compliance_readiness: f64,
    pub overall_quality: f64,
    pub improvement_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Level,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub estimated_hours: f64,
    pub dependencies: Vec<String>,
    pub related_findings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Assembled result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallAssessment {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
    RequiresReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub classifier: String,
    pub complexity: Complexity,
    pub submittal_sections: usize,
    pub specification_sections: usize,
}

/// Flat per-finding view kept for consumers of the legacy report shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub severity: Severity,
    pub category: FindingCategory,
    pub description: String,
    pub location: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: FindingCategory,
    pub score: u32,
    pub status: CategoryStatus,
}

/// The full report. The first block is the legacy flat view, the rest the enhanced view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub overall_assessment: OverallAssessment,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
    pub categories: Vec<CategoryScore>,
    pub confidence: f64,

    pub metadata: AnalysisMetadata,
    pub detailed_findings: Vec<DetailedFinding>,
    pub compliance_matrix: ComplianceMatrix,
    pub risk_assessment: RiskAssessment,
    pub quality_metrics: QualityMetrics,
    pub action_items: Vec<ActionItem>,
    pub comparison: ComparisonDetail,
}
