//! Observation intake, risk scoring, and dashboard aggregation for the FCT area councils.

pub mod collation;
pub mod dashboard;
pub mod domain;
pub mod incidents;
pub mod registry;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;
pub mod submissions;

#[cfg(test)]
mod tests;

pub use collation::{CollationIntegrity, CollationReport, ConsistencyWarning, VotingStatistics};
pub use dashboard::{
    DashboardFilter, DashboardReport, DashboardStats, LgaSummary, OverviewStats,
    ProcessIntegrityStats, RedFlagSummary, ResultsSummary, SecurityStats, TurnoutStats,
    WardSummary,
};
pub use domain::{
    AreaCouncil, LgaId, Party, PartyVotes, PollingUnit, PollingUnitId, RiskLevel, Ward, WardId,
};
pub use incidents::{
    Incident, IncidentError, IncidentFeed, IncidentId, IncidentQuery, IncidentSeverity,
    IncidentStatus, IncidentType, NewIncident,
};
pub use registry::Territory;
pub use repository::{ElectionRepository, RepositoryError, WardRecord};
pub use risk::{assess, calculate_risk_level, RiskAssessment};
pub use router::{monitoring_router, ApiState};
pub use service::{MonitoringService, MonitoringServiceError};
pub use submissions::{
    IntegritySubmission, LogisticsSubmission, ObservationSubmission, ResultsSubmission,
    StaffingSubmission, SubmissionError, SubmissionReceipt,
};
