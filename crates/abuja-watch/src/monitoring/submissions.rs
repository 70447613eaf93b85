//! Data-entry payloads posted by accredited observers, one per form section.

use super::collation::{
    CancelledPollingUnits, CollationIntegrity, ConsistencyWarning, ObserverAccess,
    PartyAgentParticipation, SecurityIncidents, StaffingAndSecurity, VotingStatistics,
};
use super::domain::{
    checked_party_total, party_votes_total, percent, ArrivalTimeCategory, CollationStartCategory,
    PartyVotes, WardId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsSubmission {
    pub ward_id: WardId,
    pub arrival_time: ArrivalTimeCategory,
    pub collation_start_time: CollationStartCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingSubmission {
    pub ward_id: WardId,
    pub inec_staff: u32,
    #[serde(default)]
    pub female_inec_staff: Option<u32>,
    pub security_present: bool,
    pub party_agents: u32,
}

impl StaffingSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        match self.female_inec_staff {
            Some(female) if female > self.inec_staff => {
                Err(SubmissionError::FemaleStaffExceedsTotal {
                    female,
                    total: self.inec_staff,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn to_staffing(&self) -> StaffingAndSecurity {
        StaffingAndSecurity {
            inec_collation_officers: self.inec_staff,
            female_inec_officers: self.female_inec_staff.unwrap_or(0),
            security_agents_present: self.security_present,
            total_party_agents: self.party_agents,
        }
    }
}

/// The collation checklist as filed. The last three items are optional on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySubmission {
    pub ward_id: WardId,
    pub ec8b_submitted: bool,
    pub ec8c_collated: bool,
    pub csrvs_done: bool,
    pub votes_announced: bool,
    pub agents_countersigned: bool,
    pub ec60e_displayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec40g_transfers_done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec40h_pwd_data_transferred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec8c_copies_distributed: Option<bool>,
}

impl IntegritySubmission {
    /// Only the items the observer actually answered.
    pub fn recorded_checks(&self) -> Vec<bool> {
        let mut checks = vec![
            self.ec8b_submitted,
            self.ec8c_collated,
            self.csrvs_done,
            self.votes_announced,
            self.agents_countersigned,
            self.ec60e_displayed,
        ];
        checks.extend(
            [
                self.ec40g_transfers_done,
                self.ec40h_pwd_data_transferred,
                self.ec8c_copies_distributed,
            ]
            .into_iter()
            .flatten(),
        );
        checks
    }

    pub fn compliance_percent(&self) -> f64 {
        let checks = self.recorded_checks();
        let passed = checks.iter().filter(|passed| **passed).count() as u64;
        percent(passed, checks.len() as u64)
    }

    /// Unanswered items count as passed so they never add risk.
    pub fn to_integrity(&self) -> CollationIntegrity {
        CollationIntegrity {
            ec8b_forms_submitted: self.ec8b_submitted,
            ec8c_properly_collated: self.ec8c_collated,
            csrvs_crosscheck_done: self.csrvs_done,
            ec40g_transfers_done: self.ec40g_transfers_done.unwrap_or(true),
            ec40h_pwd_data_transferred: self.ec40h_pwd_data_transferred.unwrap_or(true),
            votes_announced_loudly: self.votes_announced,
            party_agents_requested_to_countersign: self.agents_countersigned,
            ec8c_copies_distributed: self.ec8c_copies_distributed.unwrap_or(true),
            ec60e_displayed: self.ec60e_displayed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSubmission {
    pub ward_id: WardId,
    pub accredited_voters: u64,
    pub valid_votes: u64,
    pub rejected_votes: u64,
    pub votes_cast: u64,
    #[serde(default)]
    pub party_votes: PartyVotes,
}

impl ResultsSubmission {
    /// Refuses sheets whose tallies cannot be added without overflowing.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        let sums_fit = checked_party_total(&self.party_votes).is_some()
            && self.valid_votes.checked_add(self.rejected_votes).is_some();
        if sums_fit {
            Ok(())
        } else {
            Err(SubmissionError::VoteCountOverflow)
        }
    }

    pub fn statistics(&self, registered_voters: u64) -> VotingStatistics {
        VotingStatistics::from_counts(
            registered_voters,
            self.accredited_voters,
            self.votes_cast,
            self.valid_votes,
            self.rejected_votes,
        )
    }

    pub fn consistency_warnings(&self, registered_voters: u64) -> Vec<ConsistencyWarning> {
        let mut warnings = self.statistics(registered_voters).consistency_warnings();
        if !self.party_votes.is_empty() {
            let party_total = party_votes_total(&self.party_votes);
            if party_total != self.valid_votes {
                warnings.push(ConsistencyWarning::PartyTotalMismatch {
                    party_total,
                    valid: self.valid_votes,
                });
            }
        }
        warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSubmission {
    pub ward_id: WardId,
    pub permitted_to_observe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub disagreement_with_results: bool,
    #[serde(default)]
    pub intimidation_or_harassment: bool,
    #[serde(default)]
    pub attempted_disruption: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_details: Option<String>,
    #[serde(default)]
    pub cancelled_pus: u32,
    #[serde(default)]
    pub registered_voters_in_cancelled_pus: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countersignatures: Option<PartyAgentParticipation>,
}

impl ObservationSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.cancelled_pus == 0 && self.registered_voters_in_cancelled_pus > 0 {
            return Err(SubmissionError::CancelledVotersWithoutUnits {
                voters: self.registered_voters_in_cancelled_pus,
            });
        }
        Ok(())
    }

    pub fn observer_access(&self) -> ObserverAccess {
        ObserverAccess {
            permitted_to_observe: self.permitted_to_observe,
            denial_reason: if self.permitted_to_observe {
                None
            } else {
                self.denial_reason.clone()
            },
        }
    }

    pub fn security_incidents(&self) -> SecurityIncidents {
        SecurityIncidents {
            disagreement_with_results: self.disagreement_with_results,
            intimidation_or_harassment: self.intimidation_or_harassment,
            attempted_disruption: self.attempted_disruption,
            incident_details: self.incident_details.clone(),
        }
    }

    pub fn cancellations(&self) -> CancelledPollingUnits {
        CancelledPollingUnits {
            number_of_cancelled_pus: self.cancelled_pus,
            registered_voters_in_cancelled_pus: self.registered_voters_in_cancelled_pus,
        }
    }
}

/// Echo of an accepted submission. Figures are stored as sent; warnings only describe them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt<T> {
    pub ward_id: WardId,
    pub accepted: T,
    pub warnings: Vec<ConsistencyWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("female INEC staff ({female}) exceeds total INEC staff ({total})")]
    FemaleStaffExceedsTotal { female: u32, total: u32 },
    #[error("{voters} registered voters reported in cancelled polling units but no units were cancelled")]
    CancelledVotersWithoutUnits { voters: u64 },
    #[error("polling unit {unit} does not belong to ward {ward}")]
    PollingUnitOutsideWard { unit: String, ward: String },
    #[error("party {party} is not configured for {lga}")]
    UnconfiguredParty { party: String, lga: String },
    #[error("party configuration must list at least one party")]
    EmptyPartyList,
    #[error("vote counts on the result sheet are too large to total")]
    VoteCountOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::domain::Party;

    fn integrity(all: bool) -> IntegritySubmission {
        IntegritySubmission {
            ward_id: WardId::new("abaji-ward-1"),
            ec8b_submitted: all,
            ec8c_collated: all,
            csrvs_done: all,
            votes_announced: all,
            agents_countersigned: all,
            ec60e_displayed: all,
            ec40g_transfers_done: None,
            ec40h_pwd_data_transferred: None,
            ec8c_copies_distributed: None,
        }
    }

    #[test]
    fn compliance_ignores_unanswered_items() {
        let mut submission = integrity(true);
        assert_eq!(submission.compliance_percent(), 100.0);
        submission.csrvs_done = false;
        submission.ec60e_displayed = false;
        submission.ec40g_transfers_done = Some(false);
        submission.ec40h_pwd_data_transferred = Some(true);
        // 5 of 8 answered items passed.
        assert_eq!(submission.compliance_percent(), 62.5);
    }

    #[test]
    fn unanswered_items_are_risk_neutral() {
        let checklist = integrity(true).to_integrity();
        assert_eq!(checklist.failed_checks(), 0);
        let checklist = integrity(false).to_integrity();
        assert_eq!(checklist.failed_checks(), 6);
    }

    #[test]
    fn results_warnings_flag_party_sum_mismatch() {
        let mut party_votes = PartyVotes::new();
        party_votes.insert(Party::Apc, 300);
        party_votes.insert(Party::Lp, 150);
        let submission = ResultsSubmission {
            ward_id: WardId::new("bwari-ward-2"),
            accredited_voters: 500,
            valid_votes: 460,
            rejected_votes: 20,
            votes_cast: 480,
            party_votes,
        };
        let warnings = submission.consistency_warnings(24_578);
        assert_eq!(
            warnings,
            vec![ConsistencyWarning::PartyTotalMismatch {
                party_total: 450,
                valid: 460,
            }]
        );
    }

    #[test]
    fn party_votes_deserialize_from_lowercase_codes() {
        let submission: ResultsSubmission = serde_json::from_str(
            r#"{"ward_id":"kuje-ward-1","accredited_voters":10,"valid_votes":9,
                "rejected_votes":1,"votes_cast":10,"party_votes":{"apc":5,"pdp":4}}"#,
        )
        .expect("payload parses");
        assert_eq!(submission.party_votes.get(&Party::Pdp), Some(&4));
        assert!(submission.consistency_warnings(1_000).is_empty());
    }

    #[test]
    fn staffing_rejects_more_women_than_staff() {
        let submission = StaffingSubmission {
            ward_id: WardId::new("amac-ward-3"),
            inec_staff: 4,
            female_inec_staff: Some(5),
            security_present: true,
            party_agents: 6,
        };
        assert!(matches!(
            submission.validate(),
            Err(SubmissionError::FemaleStaffExceedsTotal { female: 5, total: 4 })
        ));
    }

    #[test]
    fn observation_drops_denial_reason_when_permitted() {
        let submission = ObservationSubmission {
            ward_id: WardId::new("kwali-ward-4"),
            permitted_to_observe: true,
            denial_reason: Some("stale note".to_string()),
            disagreement_with_results: false,
            intimidation_or_harassment: false,
            attempted_disruption: false,
            incident_details: None,
            cancelled_pus: 0,
            registered_voters_in_cancelled_pus: 40,
            countersignatures: None,
        };
        assert!(submission.observer_access().denial_reason.is_none());
        assert!(submission.validate().is_err());
    }
}
