use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collation::{
    CancelledPollingUnits, CollationIntegrity, CollationLevel, CollationReport,
    GeographicMetadata, ObserverAccess, PartyAgentParticipation, SecurityIncidents,
    SupervisorType, TimelinessMetrics, VotingStatistics,
};
use super::domain::{AreaCouncil, LgaId, Party, PartyVotes, PollingUnit, Ward, WardId};
use super::incidents::{Incident, IncidentId};
use super::submissions::{
    IntegritySubmission, LogisticsSubmission, ObservationSubmission, ResultsSubmission,
    StaffingSubmission,
};

/// Everything observers have filed for one ward, section by section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardRecord {
    pub ward_id: WardId,
    pub logistics: Option<LogisticsSubmission>,
    pub staffing: Option<StaffingSubmission>,
    pub integrity: Option<IntegritySubmission>,
    pub results: Option<ResultsSubmission>,
    pub observation: Option<ObservationSubmission>,
    pub submitted_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl WardRecord {
    pub fn new(ward_id: WardId, now: DateTime<Utc>) -> Self {
        Self {
            ward_id,
            logistics: None,
            staffing: None,
            integrity: None,
            results: None,
            observation: None,
            submitted_by: None,
            updated_at: now,
        }
    }

    pub fn is_reported(&self) -> bool {
        self.logistics.is_some()
            || self.staffing.is_some()
            || self.integrity.is_some()
            || self.results.is_some()
            || self.observation.is_some()
    }

    pub fn compliance_percent(&self) -> Option<f64> {
        self.integrity
            .as_ref()
            .map(IntegritySubmission::compliance_percent)
    }

    pub fn late_start(&self) -> bool {
        self.logistics
            .as_ref()
            .map(|logistics| logistics.collation_start_time.is_late())
            .unwrap_or(false)
    }

    pub fn denied_access(&self) -> bool {
        self.observation
            .as_ref()
            .map(|observation| !observation.permitted_to_observe)
            .unwrap_or(false)
    }

    pub fn security_present(&self) -> Option<bool> {
        self.staffing.as_ref().map(|staffing| staffing.security_present)
    }

    pub fn party_votes(&self) -> PartyVotes {
        self.results
            .as_ref()
            .map(|results| results.party_votes.clone())
            .unwrap_or_default()
    }

    pub fn cancellations(&self) -> CancelledPollingUnits {
        self.observation
            .as_ref()
            .map(ObservationSubmission::cancellations)
            .unwrap_or_default()
    }

    /// Assembles the ward-level collation report. Sections not yet filed take their
    /// risk-neutral defaults.
    pub fn collation_report(&self, ward: &Ward, council: &AreaCouncil) -> CollationReport {
        let timeliness = match &self.logistics {
            Some(logistics) => TimelinessMetrics::from_categories(
                Some(logistics.arrival_time),
                Some(logistics.collation_start_time),
            ),
            None => TimelinessMetrics::default(),
        };

        let voting_stats = match &self.results {
            Some(results) => results.statistics(ward.registered_voters),
            None => VotingStatistics::from_counts(ward.registered_voters, 0, 0, 0, 0),
        };

        CollationReport {
            id: self.ward_id.0.clone(),
            metadata: GeographicMetadata {
                state: council.state.clone(),
                lga_id: council.id.clone(),
                lga_name: council.name.clone(),
                ward_id: Some(ward.id.clone()),
                ward_name: Some(ward.name.clone()),
                collation_level: CollationLevel::Ward,
                observer_id: self.submitted_by.clone().unwrap_or_default(),
                supervisor_type: SupervisorType::Ward,
                date_of_collation: self.updated_at.date_naive(),
                arrival_time: None,
                commencement_time: None,
                completion_time: None,
            },
            timeliness,
            observer_access: self
                .observation
                .as_ref()
                .map(ObservationSubmission::observer_access)
                .unwrap_or_else(ObserverAccess::default),
            staffing: self
                .staffing
                .as_ref()
                .map(StaffingSubmission::to_staffing)
                .unwrap_or_default(),
            integrity: self
                .integrity
                .as_ref()
                .map(IntegritySubmission::to_integrity)
                .unwrap_or_else(CollationIntegrity::all_passed),
            party_participation: self
                .observation
                .as_ref()
                .and_then(|observation| observation.countersignatures)
                .unwrap_or_else(PartyAgentParticipation::default),
            incidents: self
                .observation
                .as_ref()
                .map(ObservationSubmission::security_incidents)
                .unwrap_or_else(SecurityIncidents::default),
            cancelled_pus: self.cancellations(),
            results: self.party_votes(),
            voting_stats,
            ward_reports: Vec::new(),
        }
    }
}

/// Storage abstraction so the monitoring service can be exercised in isolation.
pub trait ElectionRepository: Send + Sync {
    fn area_councils(&self) -> Result<Vec<AreaCouncil>, RepositoryError>;
    fn wards(&self, lga_id: &LgaId) -> Result<Vec<Ward>, RepositoryError>;
    fn ward(&self, ward_id: &WardId) -> Result<Option<Ward>, RepositoryError>;
    fn ward_record(&self, ward_id: &WardId) -> Result<Option<WardRecord>, RepositoryError>;
    /// Applies `apply` to the ward's record under one write, creating an empty record
    /// first when none exists.
    fn update_ward_record<F>(&self, ward_id: &WardId, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut WardRecord);
    fn polling_units(&self, ward_id: &WardId) -> Result<Vec<PollingUnit>, RepositoryError>;
    fn upsert_polling_unit(&self, unit: PollingUnit) -> Result<(), RepositoryError>;
    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError>;
    fn incident(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError>;
    fn insert_incident(&self, incident: Incident) -> Result<Incident, RepositoryError>;
    fn update_incident(&self, incident: Incident) -> Result<(), RepositoryError>;
    fn parties(&self, lga_id: &LgaId) -> Result<Option<Vec<Party>>, RepositoryError>;
    fn set_parties(&self, lga_id: &LgaId, parties: Vec<Party>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::domain::{ArrivalTimeCategory, CollationStartCategory, Coordinates};
    use crate::monitoring::risk::calculate_risk_level;
    use crate::monitoring::RiskLevel;

    fn kuje() -> (Ward, AreaCouncil) {
        let ward = Ward {
            id: WardId::new("kuje-ward-3"),
            lga_id: LgaId::new("kuje"),
            name: "Gwargwada".to_string(),
            total_polling_units: 18,
            registered_voters: 14_289,
        };
        let council = AreaCouncil {
            id: LgaId::new("kuje"),
            name: "Kuje".to_string(),
            short_name: "KUJ".to_string(),
            state: "FCT".to_string(),
            coordinates: Coordinates {
                lat: 8.8833,
                lng: 7.2333,
            },
        };
        (ward, council)
    }

    #[test]
    fn empty_record_is_unreported_and_risk_free() {
        let (ward, council) = kuje();
        let record = WardRecord::new(ward.id.clone(), Utc::now());
        assert!(!record.is_reported());
        let report = record.collation_report(&ward, &council);
        assert_eq!(calculate_risk_level(&report), RiskLevel::None);
        assert_eq!(report.voting_stats.total_registered_voters, 14_289);
    }

    #[test]
    fn filed_sections_flow_into_the_report() {
        let (ward, council) = kuje();
        let mut record = WardRecord::new(ward.id.clone(), Utc::now());
        record.logistics = Some(LogisticsSubmission {
            ward_id: ward.id.clone(),
            arrival_time: ArrivalTimeCategory::AfterSixPm,
            collation_start_time: CollationStartCategory::NinePmToMidnight,
        });
        record.observation = Some(ObservationSubmission {
            ward_id: ward.id.clone(),
            permitted_to_observe: false,
            denial_reason: Some("no accreditation tag accepted".to_string()),
            disagreement_with_results: true,
            intimidation_or_harassment: false,
            attempted_disruption: false,
            incident_details: None,
            cancelled_pus: 2,
            registered_voters_in_cancelled_pus: 1_400,
            countersignatures: None,
        });

        assert!(record.is_reported());
        assert!(record.late_start());
        assert!(record.denied_access());

        let report = record.collation_report(&ward, &council);
        assert!(report.timeliness.is_late_start);
        assert_eq!(report.cancelled_pus.registered_voters_in_cancelled_pus, 1_400);
        // denied access 3 + disagreement 2 + late start 1
        assert_eq!(calculate_risk_level(&report), RiskLevel::High);
    }
}
