//! Risk assessment: derives risk factors and paired mitigations from finding severities.

use crate::analysis::findings::severity_counts;
use crate::analysis::models::{
    DetailedFinding, Level, MitigationStrategy, RiskAssessment, RiskFactor,
};

/// Major findings tolerated before schedule risk is raised.
const MAJOR_FINDINGS_BEFORE_DELAY_RISK: usize = 2;

/// Maps the highest risk score to an overall level.
pub fn overall_risk_level(max_risk_score: u8) -> Level {
    match max_risk_score {
        8.. => Level::Critical,
        6..=7 => Level::High,
        4..=5 => Level::Medium,
        _ => Level::Low,
    }
}

pub fn assess_risk(findings: &[DetailedFinding]) -> RiskAssessment {
    let (critical, major, _) = severity_counts(findings);

    let mut risk_factors = Vec::new();
    let mut mitigation_strategies = Vec::new();

    if critical > 0 {
        risk_factors.push(RiskFactor {
            category: "Compliance Risk".to_string(),
            description: format!(
                "{critical} critical finding(s) may lead to submittal rejection or non-compliant installation"
            ),
            probability: Level::High,
            impact: Level::Critical,
            risk_score: 9,
            mitigation_required: true,
        });
        mitigation_strategies.push(MitigationStrategy {
            risk_category: "Compliance Risk".to_string(),
            strategy: "Resolve every critical finding and resubmit before procurement proceeds"
                .to_string(),
            effort: Level::High,
            timeline: "1-2 weeks".to_string(),
            responsible_party: "Design Team".to_string(),
        });
    }

    if major > MAJOR_FINDINGS_BEFORE_DELAY_RISK {
        risk_factors.push(RiskFactor {
            category: "Project Delay Risk".to_string(),
            description: format!(
                "{major} major finding(s) are likely to require a revise-and-resubmit cycle"
            ),
            probability: Level::Medium,
            impact: Level::High,
            risk_score: 6,
            mitigation_required: true,
        });
        mitigation_strategies.push(MitigationStrategy {
            risk_category: "Project Delay Risk".to_string(),
            strategy: "Batch major corrections into a single resubmittal and track review turnaround"
                .to_string(),
            effort: Level::Medium,
            timeline: "2-3 weeks".to_string(),
            responsible_party: "Project Manager".to_string(),
        });
    }

    let max_score = risk_factors.iter().map(|r| r.risk_score).max().unwrap_or(0);

    RiskAssessment {
        overall_risk: overall_risk_level(max_score),
        risk_factors,
        mitigation_strategies,
        // Fixed post-mitigation level; not derived from mitigation strength.
        residual_risk: Level::Medium,
    }
}
