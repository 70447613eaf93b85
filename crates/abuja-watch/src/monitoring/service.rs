use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::dashboard::{dashboard_stats, DashboardFilter, DashboardReport, DashboardStats};
use super::dashboard::{LgaSummary, WardSummary};
use super::domain::{AreaCouncil, LgaId, Party, PollingUnit, Ward, WardId};
use super::incidents::{
    Incident, IncidentError, IncidentFeed, IncidentId, IncidentQuery, IncidentStatus,
    NewIncident,
};
use super::repository::{ElectionRepository, RepositoryError, WardRecord};
use super::risk::{assess, RiskAssessment};
use super::submissions::{
    IntegritySubmission, LogisticsSubmission, ObservationSubmission, ResultsSubmission,
    StaffingSubmission, SubmissionError, SubmissionReceipt,
};

/// Service composing the election repository with risk scoring and aggregation.
pub struct MonitoringService<R> {
    repository: Arc<R>,
}

static INCIDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_incident_id() -> IncidentId {
    let id = INCIDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    IncidentId(format!("INC-{id:06}"))
}

impl<R> MonitoringService<R>
where
    R: ElectionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn area_councils(&self) -> Result<Vec<AreaCouncil>, MonitoringServiceError> {
        Ok(self.repository.area_councils()?)
    }

    fn council(&self, lga_id: &LgaId) -> Result<AreaCouncil, MonitoringServiceError> {
        self.repository
            .area_councils()?
            .into_iter()
            .find(|council| &council.id == lga_id)
            .ok_or_else(|| MonitoringServiceError::UnknownAreaCouncil(lga_id.clone()))
    }

    fn ward_with_council(
        &self,
        ward_id: &WardId,
    ) -> Result<(Ward, AreaCouncil), MonitoringServiceError> {
        let ward = self
            .repository
            .ward(ward_id)?
            .ok_or_else(|| MonitoringServiceError::UnknownWard(ward_id.clone()))?;
        let council = self.council(&ward.lga_id)?;
        Ok((ward, council))
    }

    fn summarise_wards(
        &self,
        council: &AreaCouncil,
        incidents: &[Incident],
    ) -> Result<Vec<WardSummary>, MonitoringServiceError> {
        let wards = self.repository.wards(&council.id)?;
        let mut summaries = Vec::with_capacity(wards.len());
        for ward in &wards {
            let record = self.repository.ward_record(&ward.id)?;
            summaries.push(WardSummary::build(ward, council, record.as_ref(), incidents));
        }
        Ok(summaries)
    }

    /// One bottom-up summary per area council, in registry order.
    pub fn area_council_summaries(&self) -> Result<Vec<LgaSummary>, MonitoringServiceError> {
        let incidents = self.repository.incidents()?;
        let councils = self.repository.area_councils()?;
        let mut summaries = Vec::with_capacity(councils.len());
        for council in &councils {
            let wards = self.summarise_wards(council, &incidents)?;
            summaries.push(LgaSummary::from_wards(council, &wards, &incidents));
        }
        Ok(summaries)
    }

    pub fn ward_summaries(
        &self,
        lga_id: &LgaId,
    ) -> Result<Vec<WardSummary>, MonitoringServiceError> {
        let council = self.council(lga_id)?;
        let incidents = self.repository.incidents()?;
        self.summarise_wards(&council, &incidents)
    }

    pub fn ward_summary(&self, ward_id: &WardId) -> Result<WardSummary, MonitoringServiceError> {
        let (ward, council) = self.ward_with_council(ward_id)?;
        let record = self.repository.ward_record(ward_id)?;
        let incidents = self.repository.incidents()?;
        Ok(WardSummary::build(&ward, &council, record.as_ref(), &incidents))
    }

    /// Factor-by-factor breakdown of a ward's risk classification.
    pub fn ward_risk(&self, ward_id: &WardId) -> Result<RiskAssessment, MonitoringServiceError> {
        let (ward, council) = self.ward_with_council(ward_id)?;
        let record = self
            .repository
            .ward_record(ward_id)?
            .unwrap_or_else(|| WardRecord::new(ward.id.clone(), Utc::now()));
        Ok(assess(&record.collation_report(&ward, &council)))
    }

    pub fn polling_units(
        &self,
        ward_id: &WardId,
    ) -> Result<Vec<PollingUnit>, MonitoringServiceError> {
        self.ward_with_council(ward_id)?;
        Ok(self.repository.polling_units(ward_id)?)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, MonitoringServiceError> {
        let councils = self.repository.area_councils()?;
        let incidents = self.repository.incidents()?;
        let mut wards = Vec::new();
        for council in &councils {
            wards.extend(self.summarise_wards(council, &incidents)?);
        }
        Ok(dashboard_stats(councils.len(), &wards))
    }

    pub fn dashboard_report(
        &self,
        filter: &DashboardFilter,
    ) -> Result<DashboardReport, MonitoringServiceError> {
        if let Some(lga_id) = &filter.lga_id {
            self.council(lga_id)?;
        }
        let summaries = filter.apply(&self.area_council_summaries()?);
        let incidents = self.repository.incidents()?;
        Ok(DashboardReport::from_summaries(
            summaries,
            &incidents,
            Utc::now(),
        ))
    }

    fn update_record<F>(
        &self,
        ward_id: &WardId,
        submitted_by: &str,
        apply: F,
    ) -> Result<(), MonitoringServiceError>
    where
        F: FnOnce(&mut WardRecord),
    {
        self.repository.update_ward_record(ward_id, |record| {
            apply(record);
            record.submitted_by = Some(submitted_by.to_string());
            record.updated_at = Utc::now();
        })?;
        Ok(())
    }

    pub fn submit_logistics(
        &self,
        submission: LogisticsSubmission,
        submitted_by: &str,
    ) -> Result<SubmissionReceipt<LogisticsSubmission>, MonitoringServiceError> {
        self.ward_with_council(&submission.ward_id)?;
        let accepted = submission.clone();
        self.update_record(&accepted.ward_id, submitted_by, |record| {
            record.logistics = Some(submission);
        })?;
        info!(
            ward = %accepted.ward_id,
            start = accepted.collation_start_time.label(),
            "logistics submitted"
        );
        Ok(SubmissionReceipt {
            ward_id: accepted.ward_id.clone(),
            accepted,
            warnings: Vec::new(),
        })
    }

    pub fn submit_staffing(
        &self,
        submission: StaffingSubmission,
        submitted_by: &str,
    ) -> Result<SubmissionReceipt<StaffingSubmission>, MonitoringServiceError> {
        self.ward_with_council(&submission.ward_id)?;
        submission.validate()?;
        let accepted = submission.clone();
        self.update_record(&accepted.ward_id, submitted_by, |record| {
            record.staffing = Some(submission);
        })?;
        info!(ward = %accepted.ward_id, security = accepted.security_present, "staffing submitted");
        Ok(SubmissionReceipt {
            ward_id: accepted.ward_id.clone(),
            accepted,
            warnings: Vec::new(),
        })
    }

    pub fn submit_integrity(
        &self,
        submission: IntegritySubmission,
        submitted_by: &str,
    ) -> Result<SubmissionReceipt<IntegritySubmission>, MonitoringServiceError> {
        self.ward_with_council(&submission.ward_id)?;
        let accepted = submission.clone();
        self.update_record(&accepted.ward_id, submitted_by, |record| {
            record.integrity = Some(submission);
        })?;
        info!(
            ward = %accepted.ward_id,
            compliance = accepted.compliance_percent(),
            "integrity checklist submitted"
        );
        Ok(SubmissionReceipt {
            ward_id: accepted.ward_id.clone(),
            accepted,
            warnings: Vec::new(),
        })
    }

    /// Stores results exactly as filed; arithmetic problems come back as warnings.
    pub fn submit_results(
        &self,
        submission: ResultsSubmission,
        submitted_by: &str,
    ) -> Result<SubmissionReceipt<ResultsSubmission>, MonitoringServiceError> {
        let (ward, council) = self.ward_with_council(&submission.ward_id)?;
        submission.validate()?;
        if let Some(configured) = self.repository.parties(&council.id)? {
            if let Some(party) = submission
                .party_votes
                .keys()
                .find(|party| !configured.contains(party))
            {
                return Err(SubmissionError::UnconfiguredParty {
                    party: party.label().to_string(),
                    lga: council.name.clone(),
                }
                .into());
            }
        }

        let warnings = submission.consistency_warnings(ward.registered_voters);
        let accepted = submission.clone();
        self.update_record(&accepted.ward_id, submitted_by, |record| {
            record.results = Some(submission);
        })?;
        info!(
            ward = %accepted.ward_id,
            votes_cast = accepted.votes_cast,
            warnings = warnings.len(),
            "results submitted"
        );
        Ok(SubmissionReceipt {
            ward_id: accepted.ward_id.clone(),
            accepted,
            warnings,
        })
    }

    pub fn submit_observation(
        &self,
        submission: ObservationSubmission,
        submitted_by: &str,
    ) -> Result<SubmissionReceipt<ObservationSubmission>, MonitoringServiceError> {
        self.ward_with_council(&submission.ward_id)?;
        submission.validate()?;
        let accepted = submission.clone();
        self.update_record(&accepted.ward_id, submitted_by, |record| {
            record.observation = Some(submission);
        })?;
        info!(
            ward = %accepted.ward_id,
            permitted = accepted.permitted_to_observe,
            cancelled_pus = accepted.cancelled_pus,
            "observation submitted"
        );
        Ok(SubmissionReceipt {
            ward_id: accepted.ward_id.clone(),
            accepted,
            warnings: Vec::new(),
        })
    }

    pub fn report_polling_unit(
        &self,
        unit: PollingUnit,
    ) -> Result<PollingUnit, MonitoringServiceError> {
        let (ward, _) = self.ward_with_council(&unit.ward_id)?;
        if ward.lga_id != unit.lga_id {
            return Err(SubmissionError::PollingUnitOutsideWard {
                unit: unit.id.0.clone(),
                ward: ward.id.0.clone(),
            }
            .into());
        }
        self.repository.upsert_polling_unit(unit.clone())?;
        info!(unit = %unit.id, ward = %unit.ward_id, bvas = unit.bvas_status.label(), "polling unit status updated");
        Ok(unit)
    }

    /// Parties on the ballot for a council; every party when none are configured.
    pub fn parties(&self, lga_id: &LgaId) -> Result<Vec<Party>, MonitoringServiceError> {
        self.council(lga_id)?;
        Ok(self
            .repository
            .parties(lga_id)?
            .unwrap_or_else(|| Party::ordered().to_vec()))
    }

    pub fn set_parties(
        &self,
        lga_id: &LgaId,
        parties: Vec<Party>,
    ) -> Result<Vec<Party>, MonitoringServiceError> {
        self.council(lga_id)?;
        let mut unique = Vec::with_capacity(parties.len());
        for party in parties {
            if !unique.contains(&party) {
                unique.push(party);
            }
        }
        if unique.is_empty() {
            return Err(SubmissionError::EmptyPartyList.into());
        }
        self.repository.set_parties(lga_id, unique.clone())?;
        info!(lga = %lga_id, parties = unique.len(), "party configuration updated");
        Ok(unique)
    }

    pub fn incident_feed(
        &self,
        query: &IncidentQuery,
    ) -> Result<IncidentFeed, MonitoringServiceError> {
        Ok(IncidentFeed::build(&self.repository.incidents()?, query))
    }

    pub fn report_incident(
        &self,
        new_incident: NewIncident,
        reporter: &str,
    ) -> Result<Incident, MonitoringServiceError> {
        let location = new_incident.location;
        self.council(&location.lga_id)?;
        if let Some(ward_id) = &location.ward_id {
            let (ward, _) = self.ward_with_council(ward_id)?;
            if ward.lga_id != location.lga_id {
                return Err(MonitoringServiceError::UnknownWard(ward_id.clone()));
            }
        }

        let incident = Incident {
            id: next_incident_id(),
            kind: new_incident.kind,
            severity: new_incident.severity,
            status: IncidentStatus::Reported,
            title: new_incident.title,
            description: new_incident.description,
            location,
            reported_by: new_incident
                .reported_by
                .unwrap_or_else(|| reporter.to_string()),
            timestamp: new_incident.timestamp.unwrap_or_else(Utc::now),
        };
        let stored = self.repository.insert_incident(incident)?;
        info!(
            incident = %stored.id,
            kind = stored.kind.label(),
            lga = %stored.location.lga_id,
            "incident reported"
        );
        Ok(stored)
    }

    pub fn advance_incident(
        &self,
        id: &IncidentId,
        status: IncidentStatus,
    ) -> Result<Incident, MonitoringServiceError> {
        let mut incident = self
            .repository
            .incident(id)?
            .ok_or_else(|| MonitoringServiceError::UnknownIncident(id.clone()))?;
        let previous = incident.advance(status)?;
        self.repository.update_incident(incident.clone())?;
        info!(
            incident = %incident.id,
            from = previous.label(),
            to = incident.status.label(),
            "incident status advanced"
        );
        Ok(incident)
    }
}

/// Error raised by the monitoring service.
#[derive(Debug, thiserror::Error)]
pub enum MonitoringServiceError {
    #[error("unknown area council {0}")]
    UnknownAreaCouncil(LgaId),
    #[error("unknown ward {0}")]
    UnknownWard(WardId),
    #[error("unknown incident {0}")]
    UnknownIncident(IncidentId),
    #[error(transparent)]
    Incident(#[from] IncidentError),
    #[error(transparent)]
    InvalidSubmission(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
