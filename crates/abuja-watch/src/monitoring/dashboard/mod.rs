pub mod aggregate;
mod summary;
pub mod views;

use super::domain::{LgaId, RiskLevel};
use super::incidents::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use aggregate::{
    dashboard_stats, fct_totals, overall_integrity_score, overview_stats,
    process_integrity_stats, red_flag_summary, results_summary, security_stats, turnout_stats,
};
pub use views::{
    DashboardReport, DashboardStats, FctTotals, LgaSummary, OverviewStats, PartyStanding,
    PollingUnitBreakdown, ProcessIntegrityStats, RedFlagSummary, ResultsSummary, SecurityStats,
    TurnoutStats, WardSummary,
};

/// The dashboard filter bar: narrow by council and by risk level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    #[serde(default)]
    pub lga_id: Option<LgaId>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

impl DashboardFilter {
    pub fn matches(&self, summary: &LgaSummary) -> bool {
        self.lga_id.as_ref().map_or(true, |id| &summary.id == id)
            && self
                .risk_level
                .map_or(true, |level| summary.risk_level == level)
    }

    pub fn apply(&self, summaries: &[LgaSummary]) -> Vec<LgaSummary> {
        summaries
            .iter()
            .filter(|summary| self.matches(summary))
            .cloned()
            .collect()
    }
}

impl DashboardReport {
    /// Runs every aggregator over the same set of summaries.
    pub fn from_summaries(
        summaries: Vec<LgaSummary>,
        incidents: &[Incident],
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            overview: overview_stats(&summaries),
            process_integrity: process_integrity_stats(&summaries),
            security: security_stats(&summaries),
            results: results_summary(&summaries),
            turnout: turnout_stats(&summaries),
            red_flags: red_flag_summary(&summaries),
            totals: fct_totals(&summaries, incidents),
            area_councils: summaries,
        }
    }
}
