//! Finding categories: the ten fixed buckets every finding, section and matrix row falls into.
//!
//! Each per-category table below is an exhaustive `match`, so a new variant cannot be
//! added without also giving it a weight and a keyword list.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    MaterialSpecifications,
    DimensionalRequirements,
    PerformanceStandards,
    TestingRequirements,
    InstallationProcedures,
    QualityControl,
    SafetyRequirements,
    RegulatoryCompliance,
    EnvironmentalConsiderations,
    Documentation,
}

impl FindingCategory {
    /// Canonical order. Title keyword search walks this list and the matrix is laid out in it.
    pub const ALL: [FindingCategory; 10] = [
        FindingCategory::MaterialSpecifications,
        FindingCategory::DimensionalRequirements,
        FindingCategory::PerformanceStandards,
        FindingCategory::TestingRequirements,
        FindingCategory::InstallationProcedures,
        FindingCategory::QualityControl,
        FindingCategory::SafetyRequirements,
        FindingCategory::RegulatoryCompliance,
        FindingCategory::EnvironmentalConsiderations,
        FindingCategory::Documentation,
    ];

    /// Fixed weight used by the weighted overall compliance score.
    pub fn weight(self) -> f64 {
        match self {
            FindingCategory::SafetyRequirements => 1.0,
            FindingCategory::RegulatoryCompliance => 0.95,
            FindingCategory::PerformanceStandards => 0.85,
            FindingCategory::MaterialSpecifications => 0.8,
            FindingCategory::TestingRequirements => 0.75,
            FindingCategory::QualityControl => 0.75,
            FindingCategory::DimensionalRequirements => 0.7,
            FindingCategory::InstallationProcedures => 0.7,
            FindingCategory::EnvironmentalConsiderations => 0.5,
            FindingCategory::Documentation => 0.5,
        }
    }

    /// Lowercase substrings that place a section title in this category.
    /// `Documentation` has none: it is the fallback.
    pub fn title_keywords(self) -> &'static [&'static str] {
        match self {
            FindingCategory::MaterialSpecifications => &["material", "product"],
            FindingCategory::DimensionalRequirements => &["dimension", "size"],
            FindingCategory::PerformanceStandards => &["performance", "standard"],
            FindingCategory::TestingRequirements => &["test", "verification"],
            FindingCategory::InstallationProcedures => &["install", "application"],
            FindingCategory::QualityControl => &["quality", "control"],
            FindingCategory::SafetyRequirements => &["safety", "hazard", "fire"],
            FindingCategory::RegulatoryCompliance => &["code", "regulation"],
            FindingCategory::EnvironmentalConsiderations => &["environment", "green"],
            FindingCategory::Documentation => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingCategory::MaterialSpecifications => "material-specifications",
            FindingCategory::DimensionalRequirements => "dimensional-requirements",
            FindingCategory::PerformanceStandards => "performance-standards",
            FindingCategory::TestingRequirements => "testing-requirements",
            FindingCategory::InstallationProcedures => "installation-procedures",
            FindingCategory::QualityControl => "quality-control",
            FindingCategory::SafetyRequirements => "safety-requirements",
            FindingCategory::RegulatoryCompliance => "regulatory-compliance",
            FindingCategory::EnvironmentalConsiderations => "environmental-considerations",
            FindingCategory::Documentation => "documentation",
        }
    }

    /// Position in `ALL`, used to keep matrix rows in canonical order.
    pub fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
