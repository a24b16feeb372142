use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Service configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Engine defaults applied to every request that does not override them.
    pub analysis: AnalysisConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AnalysisConfig::default();
        let analysis = AnalysisConfig {
            strict_mode: parse_env("STRICT_MODE", defaults.strict_mode)?,
            confidence_threshold: parse_env("CONFIDENCE_THRESHOLD", defaults.confidence_threshold)?,
            max_critical_issues: parse_env("MAX_CRITICAL_ISSUES", defaults.max_critical_issues)?,
            compliance_pass_score: parse_env(
                "COMPLIANCE_PASS_SCORE",
                defaults.compliance_pass_score,
            )?,
            conditional_score: parse_env("CONDITIONAL_SCORE", defaults.conditional_score)?,
            match_threshold: parse_env("MATCH_THRESHOLD", defaults.match_threshold)?,
        };
        analysis
            .validate()
            .context("Engine defaults from the environment are out of range")?;

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Per-analysis tuning knobs. Every threshold the pipeline uses lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Escalates weak correspondences to correction-required major differences.
    pub strict_mode: bool,
    /// Matches below this confidence count as weak correspondences. 0.0 – 1.0.
    pub confidence_threshold: f64,
    /// Critical findings beyond this count trigger a reject-and-resubmit recommendation.
    pub max_critical_issues: usize,
    /// Category score needed for "pass". 0 – 100.
    pub compliance_pass_score: u32,
    /// Category score needed for "conditional". 0 – compliance_pass_score.
    pub conditional_score: u32,
    /// Similarity a pair must exceed to be accepted as a match. 0.0 – 1.0.
    pub match_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            confidence_threshold: 0.7,
            max_critical_issues: 5,
            compliance_pass_score: 80,
            conditional_score: 60,
            match_threshold: 0.30,
        }
    }
}

/// Per-request tuning. Fields left unset keep the service-wide value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOverrides {
    pub strict_mode: Option<bool>,
    pub confidence_threshold: Option<f64>,
    pub max_critical_issues: Option<usize>,
    pub compliance_pass_score: Option<u32>,
    pub conditional_score: Option<u32>,
    pub match_threshold: Option<f64>,
}

impl AnalysisOverrides {
    pub fn apply_to(&self, base: &AnalysisConfig) -> AnalysisConfig {
        AnalysisConfig {
            strict_mode: self.strict_mode.unwrap_or(base.strict_mode),
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(base.confidence_threshold),
            max_critical_issues: self.max_critical_issues.unwrap_or(base.max_critical_issues),
            compliance_pass_score: self
                .compliance_pass_score
                .unwrap_or(base.compliance_pass_score),
            conditional_score: self.conditional_score.unwrap_or(base.conditional_score),
            match_threshold: self.match_threshold.unwrap_or(base.match_threshold),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence_threshold must be within 0.0–1.0 (got {})",
                self.confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            bail!(
                "match_threshold must be within 0.0–1.0 (got {})",
                self.match_threshold
            );
        }
        if self.compliance_pass_score > 100 {
            bail!(
                "compliance_pass_score must be within 0–100 (got {})",
                self.compliance_pass_score
            );
        }
        if self.conditional_score > self.compliance_pass_score {
            bail!(
                "conditional_score ({}) cannot exceed compliance_pass_score ({})",
                self.conditional_score,
                self.compliance_pass_score
            );
        }
        Ok(())
    }
}
