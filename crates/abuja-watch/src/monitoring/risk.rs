use super::collation::CollationReport;
use super::domain::RiskLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    ObserverAccessDenied,
    IntimidationOrHarassment,
    AttemptedDisruption,
    DisagreementWithResults,
    NoSecurityAgents,
    LateCollationStart,
    FailedIntegrityChecks,
}

impl RiskFactor {
    pub const fn weight(self) -> u32 {
        match self {
            Self::ObserverAccessDenied | Self::IntimidationOrHarassment => 3,
            Self::AttemptedDisruption | Self::DisagreementWithResults => 2,
            Self::NoSecurityAgents | Self::LateCollationStart => 1,
            // Scaled by the number of failed checks instead.
            Self::FailedIntegrityChecks => 0,
        }
    }
}

/// One contribution to a risk score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskComponent {
    pub factor: RiskFactor,
    pub points: u32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub components: Vec<RiskComponent>,
}

/// Scores a collation report and keeps the trail of contributing factors.
pub fn assess(report: &CollationReport) -> RiskAssessment {
    let mut components = Vec::new();
    let mut push = |factor: RiskFactor, notes: &str| {
        components.push(RiskComponent {
            factor,
            points: factor.weight(),
            notes: notes.to_string(),
        });
    };

    if !report.observer_access.permitted_to_observe {
        push(
            RiskFactor::ObserverAccessDenied,
            report
                .observer_access
                .denial_reason
                .as_deref()
                .unwrap_or("observer refused access to collation"),
        );
    }
    if report.incidents.intimidation_or_harassment {
        push(
            RiskFactor::IntimidationOrHarassment,
            "intimidation or harassment reported",
        );
    }
    if report.incidents.attempted_disruption {
        push(RiskFactor::AttemptedDisruption, "attempted disruption reported");
    }
    if report.incidents.disagreement_with_results {
        push(
            RiskFactor::DisagreementWithResults,
            "disagreement with announced results",
        );
    }
    if !report.staffing.security_agents_present {
        push(RiskFactor::NoSecurityAgents, "no security agents present");
    }
    if report.timeliness.is_late_start {
        push(RiskFactor::LateCollationStart, "collation started late");
    }

    let failed = report.integrity.failed_checks();
    let integrity_points = failed / 2;
    if integrity_points > 0 {
        components.push(RiskComponent {
            factor: RiskFactor::FailedIntegrityChecks,
            points: integrity_points,
            notes: format!(
                "{failed} of {} integrity checks failed",
                super::collation::CollationIntegrity::CHECK_COUNT
            ),
        });
    }

    let score = components.iter().map(|component| component.points).sum();

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        components,
    }
}

pub fn risk_score(report: &CollationReport) -> u32 {
    assess(report).score
}

pub fn calculate_risk_level(report: &CollationReport) -> RiskLevel {
    assess(report).level
}
