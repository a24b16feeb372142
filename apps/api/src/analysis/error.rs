use thiserror::Error;

use crate::analysis::validation::ValidationIssue;

/// Faults inside the comparison pipeline. Never leaves the engine: `ComparisonEngine::analyze`
/// turns it into a degraded outcome.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),

    #[error("Section '{0}' referenced by a match does not exist")]
    UnknownSection(String),

    #[error("Non-finite value computed for {0}")]
    NonFiniteScore(&'static str),

    #[error("Compliance matrix is missing categories: {0}")]
    IncompleteMatrix(String),
}

/// Raised only when sanitisation could not repair a report.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Report failed validation after sanitisation ({} issue(s))", .0.len())]
    Unsanitizable(Vec<ValidationIssue>),
}
