use super::super::collation::{CollationIntegrity, ConsistencyWarning};
use super::super::domain::{
    ArrivalTimeCategory, CollationStartCategory, Coordinates, LgaId, Party, PartyVotes,
    RiskLevel, WardId,
};
use super::super::incidents::IncidentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rolled-up figures for one area council, as rendered on the LGA grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LgaSummary {
    pub id: LgaId,
    pub name: String,
    pub short_name: String,
    pub state: String,
    pub wards: u32,
    pub polling_units: u32,
    pub registered_voters: u64,
    pub accredited_voters: u64,
    pub votes_cast: u64,
    pub valid_votes: u64,
    pub rejected_votes: u64,
    pub turnout_percent: f64,
    pub wards_reported: u32,
    /// Mean checklist compliance; `None` until a ward files its checklist.
    #[serde(default)]
    pub compliance_score: Option<f64>,
    pub incident_count: u32,
    #[serde(default)]
    pub incident_breakdown: BTreeMap<IncidentType, u32>,
    pub denied_access_count: u32,
    pub late_start_count: u32,
    #[serde(rename = "cancelledPUs")]
    pub cancelled_pus: u32,
    pub lost_voters: u64,
    pub security_present: f64,
    pub observer_coverage: f64,
    pub risk_level: RiskLevel,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub party_results: PartyVotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardSummary {
    pub id: WardId,
    pub lga_id: LgaId,
    pub name: String,
    pub polling_units: u32,
    pub registered_voters: u64,
    pub accredited_voters: u64,
    pub votes_cast: u64,
    pub valid_votes: u64,
    pub rejected_votes: u64,
    pub turnout_percent: f64,
    pub reported: bool,
    /// `None` until the integrity checklist is filed.
    pub compliance_score: Option<f64>,
    pub incident_count: u32,
    pub denied_access: bool,
    pub late_start: bool,
    #[serde(rename = "cancelledPUs")]
    pub cancelled_pus: u32,
    pub lost_voters: u64,
    pub security_present: Option<bool>,
    pub observer_present: Option<bool>,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub arrival_category: Option<ArrivalTimeCategory>,
    pub start_category: Option<CollationStartCategory>,
    #[serde(default)]
    pub party_results: PartyVotes,
    pub integrity: Option<CollationIntegrity>,
    #[serde(default)]
    pub warnings: Vec<ConsistencyWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    #[serde(rename = "totalLGAs")]
    pub total_lgas: u32,
    pub total_wards: u32,
    pub wards_reported: u32,
    #[serde(rename = "lgasReported")]
    pub lgas_reported: u32,
    pub compliance_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessIntegrityStats {
    pub timeliness_score: f64,
    pub access_score: f64,
    pub compliance_score: f64,
    pub overall_integrity_score: f64,
    pub late_start_percent: f64,
    pub denied_access_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStats {
    pub total_incidents: u32,
    pub intimidation_count: u32,
    pub disruption_attempts: u32,
    pub disagreements: u32,
    #[serde(rename = "incidentsByLGA")]
    pub incidents_by_lga: BTreeMap<LgaId, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyStanding {
    pub party: Party,
    pub votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub party_totals: PartyVotes,
    /// Highest first; equal totals keep party declaration order.
    pub standings: Vec<PartyStanding>,
    #[serde(default, with = "crate::monitoring::domain::party_label")]
    pub leading_party: Option<Party>,
    pub margin_of_victory: u64,
    pub total_valid_votes: u64,
    pub total_rejected_votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoutStats {
    pub overall_turnout: f64,
    #[serde(rename = "cancelledPUs")]
    pub cancelled_pus: u32,
    pub lost_voters: u64,
    #[serde(rename = "turnoutByLGA")]
    pub turnout_by_lga: BTreeMap<LgaId, f64>,
}

/// Counts marked `estimated` are derived from compliance scores, not observed directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlagSummary {
    pub no_observer_access: u32,
    pub late_starts: u32,
    pub estimated_no_countersignatures: u32,
    pub estimated_integrity_violations: u32,
    pub flagged_locations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FctTotals {
    pub total_polling_units: u32,
    pub total_registered_voters: u64,
    pub total_accredited_voters: u64,
    pub total_votes_cast: u64,
    pub total_valid_votes: u64,
    pub total_rejected_votes: u64,
    pub turnout_percent: f64,
    pub active_incidents: u32,
    pub resolved_incidents: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingUnitBreakdown {
    pub operational: u32,
    pub minor_issues: u32,
    pub offline: u32,
    pub not_opened: u32,
}

/// Headline counters for the situation room banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(rename = "totalLGAs")]
    pub total_lgas: u32,
    pub total_wards: u32,
    pub wards_reported: u32,
    #[serde(rename = "lgasReported")]
    pub lgas_reported: u32,
    pub compliance_percent: f64,
    pub total_polling_units: u32,
    pub open_polling_units: u32,
    pub polling_unit_breakdown: PollingUnitBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub overview: OverviewStats,
    pub process_integrity: ProcessIntegrityStats,
    pub security: SecurityStats,
    pub results: ResultsSummary,
    pub turnout: TurnoutStats,
    pub red_flags: RedFlagSummary,
    pub totals: FctTotals,
    pub area_councils: Vec<LgaSummary>,
}
