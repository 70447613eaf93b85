//! Ward- and LGA-level collation reports as filed by observers.

use super::domain::{
    party_votes_total, percent, ArrivalTimeCategory, CollationStartCategory, CountersignStatus,
    LgaId, PartyVotes, WardId,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollationLevel {
    #[serde(rename = "WARD")]
    Ward,
    #[serde(rename = "LGA")]
    Lga,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupervisorType {
    #[serde(rename = "WARD Supervisor")]
    Ward,
    #[serde(rename = "LGA Supervisor")]
    Lga,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicMetadata {
    pub state: String,
    pub lga_id: LgaId,
    pub lga_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<WardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    pub collation_level: CollationLevel,
    pub observer_id: String,
    pub supervisor_type: SupervisorType,
    pub date_of_collation: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commencement_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<NaiveTime>,
}

/// Categories are optional because a ward may report before logistics arrive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinessMetrics {
    #[serde(default)]
    pub arrival_time_category: Option<ArrivalTimeCategory>,
    #[serde(default)]
    pub collation_start_category: Option<CollationStartCategory>,
    pub is_late_start: bool,
    pub sla_compliant: bool,
}

impl TimelinessMetrics {
    pub fn from_categories(
        arrival: Option<ArrivalTimeCategory>,
        start: Option<CollationStartCategory>,
    ) -> Self {
        let is_late_start = start.map(CollationStartCategory::is_late).unwrap_or(false);
        let late_arrival = matches!(arrival, Some(ArrivalTimeCategory::AfterSixPm));
        Self {
            arrival_time_category: arrival,
            collation_start_category: start,
            is_late_start,
            sla_compliant: start.is_some() && !is_late_start && !late_arrival,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverAccess {
    pub permitted_to_observe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
}

impl Default for ObserverAccess {
    fn default() -> Self {
        Self {
            permitted_to_observe: true,
            denial_reason: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffingAndSecurity {
    pub inec_collation_officers: u32,
    pub female_inec_officers: u32,
    pub security_agents_present: bool,
    pub total_party_agents: u32,
}

impl Default for StaffingAndSecurity {
    fn default() -> Self {
        Self {
            inec_collation_officers: 0,
            female_inec_officers: 0,
            security_agents_present: true,
            total_party_agents: 0,
        }
    }
}

/// The nine-item collation checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollationIntegrity {
    pub ec8b_forms_submitted: bool,
    pub ec8c_properly_collated: bool,
    pub csrvs_crosscheck_done: bool,
    pub ec40g_transfers_done: bool,
    pub ec40h_pwd_data_transferred: bool,
    pub votes_announced_loudly: bool,
    pub party_agents_requested_to_countersign: bool,
    pub ec8c_copies_distributed: bool,
    pub ec60e_displayed: bool,
}

impl CollationIntegrity {
    pub const CHECK_COUNT: u32 = 9;

    pub const fn all_passed() -> Self {
        Self {
            ec8b_forms_submitted: true,
            ec8c_properly_collated: true,
            csrvs_crosscheck_done: true,
            ec40g_transfers_done: true,
            ec40h_pwd_data_transferred: true,
            votes_announced_loudly: true,
            party_agents_requested_to_countersign: true,
            ec8c_copies_distributed: true,
            ec60e_displayed: true,
        }
    }

    pub const fn checks(&self) -> [bool; 9] {
        [
            self.ec8b_forms_submitted,
            self.ec8c_properly_collated,
            self.csrvs_crosscheck_done,
            self.ec40g_transfers_done,
            self.ec40h_pwd_data_transferred,
            self.votes_announced_loudly,
            self.party_agents_requested_to_countersign,
            self.ec8c_copies_distributed,
            self.ec60e_displayed,
        ]
    }

    pub fn failed_checks(&self) -> u32 {
        self.checks().iter().filter(|passed| !**passed).count() as u32
    }
}

impl Default for CollationIntegrity {
    fn default() -> Self {
        Self::all_passed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAgentParticipation {
    pub apc_countersigned: CountersignStatus,
    pub lp_countersigned: CountersignStatus,
    pub pdp_countersigned: CountersignStatus,
    pub apga_countersigned: CountersignStatus,
    pub nnpp_countersigned: CountersignStatus,
    pub other_parties_countersigned: CountersignStatus,
}

impl PartyAgentParticipation {
    pub const fn statuses(&self) -> [CountersignStatus; 6] {
        [
            self.apc_countersigned,
            self.lp_countersigned,
            self.pdp_countersigned,
            self.apga_countersigned,
            self.nnpp_countersigned,
            self.other_parties_countersigned,
        ]
    }

    /// Agents who were present but declined to countersign.
    pub fn refusals(&self) -> u32 {
        self.statuses()
            .iter()
            .filter(|status| **status == CountersignStatus::No)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIncidents {
    pub disagreement_with_results: bool,
    pub intimidation_or_harassment: bool,
    pub attempted_disruption: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledPollingUnits {
    #[serde(rename = "numberOfCancelledPUs")]
    pub number_of_cancelled_pus: u32,
    #[serde(rename = "registeredVotersInCancelledPUs")]
    pub registered_voters_in_cancelled_pus: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatistics {
    pub total_registered_voters: u64,
    pub total_accredited_voters: u64,
    pub total_votes_cast: u64,
    pub total_valid_votes: u64,
    pub total_rejected_votes: u64,
    pub turnout_percent: f64,
}

impl VotingStatistics {
    /// Builds statistics from raw counts; turnout is derived, nothing else is adjusted.
    pub fn from_counts(
        registered: u64,
        accredited: u64,
        cast: u64,
        valid: u64,
        rejected: u64,
    ) -> Self {
        Self {
            total_registered_voters: registered,
            total_accredited_voters: accredited,
            total_votes_cast: cast,
            total_valid_votes: valid,
            total_rejected_votes: rejected,
            turnout_percent: percent(cast, registered),
        }
    }

    pub fn consistency_warnings(&self) -> Vec<ConsistencyWarning> {
        let mut warnings = Vec::new();
        if self.total_accredited_voters > self.total_registered_voters {
            warnings.push(ConsistencyWarning::AccreditedExceedsRegistered {
                accredited: self.total_accredited_voters,
                registered: self.total_registered_voters,
            });
        }
        if self
            .total_valid_votes
            .checked_add(self.total_rejected_votes)
            != Some(self.total_votes_cast)
        {
            warnings.push(ConsistencyWarning::VoteSplitMismatch {
                valid: self.total_valid_votes,
                rejected: self.total_rejected_votes,
                cast: self.total_votes_cast,
            });
        }
        if self.total_votes_cast > self.total_accredited_voters {
            warnings.push(ConsistencyWarning::CastExceedsAccredited {
                cast: self.total_votes_cast,
                accredited: self.total_accredited_voters,
            });
        }
        warnings
    }
}

/// A figure that breaks an expected arithmetic relation. Reported, never corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    AccreditedExceedsRegistered { accredited: u64, registered: u64 },
    VoteSplitMismatch { valid: u64, rejected: u64, cast: u64 },
    CastExceedsAccredited { cast: u64, accredited: u64 },
    PartyTotalMismatch { party_total: u64, valid: u64 },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::AccreditedExceedsRegistered {
                accredited,
                registered,
            } => write!(
                f,
                "accredited voters ({accredited}) exceed registered voters ({registered})"
            ),
            ConsistencyWarning::VoteSplitMismatch {
                valid,
                rejected,
                cast,
            } => write!(
                f,
                "valid ({valid}) plus rejected ({rejected}) votes do not equal votes cast ({cast})"
            ),
            ConsistencyWarning::CastExceedsAccredited { cast, accredited } => write!(
                f,
                "votes cast ({cast}) exceed accredited voters ({accredited})"
            ),
            ConsistencyWarning::PartyTotalMismatch { party_total, valid } => write!(
                f,
                "party votes total ({party_total}) differs from valid votes ({valid})"
            ),
        }
    }
}

/// A ward- or LGA-level collation report. LGA reports carry their ward reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollationReport {
    pub id: String,
    pub metadata: GeographicMetadata,
    pub timeliness: TimelinessMetrics,
    pub observer_access: ObserverAccess,
    pub staffing: StaffingAndSecurity,
    pub integrity: CollationIntegrity,
    pub party_participation: PartyAgentParticipation,
    pub incidents: SecurityIncidents,
    #[serde(rename = "cancelledPUs")]
    pub cancelled_pus: CancelledPollingUnits,
    pub results: PartyVotes,
    pub voting_stats: VotingStatistics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ward_reports: Vec<CollationReport>,
}

impl CollationReport {
    pub fn level(&self) -> CollationLevel {
        self.metadata.collation_level
    }

    /// Statistical warnings plus a party-sum check when party results were filed.
    pub fn consistency_warnings(&self) -> Vec<ConsistencyWarning> {
        let mut warnings = self.voting_stats.consistency_warnings();
        if !self.results.is_empty() {
            let party_total = party_votes_total(&self.results);
            if party_total != self.voting_stats.total_valid_votes {
                warnings.push(ConsistencyWarning::PartyTotalMismatch {
                    party_total,
                    valid: self.voting_stats.total_valid_votes,
                });
            }
        }
        warnings
    }
}
