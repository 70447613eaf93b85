use super::domain::{LgaId, PollingUnitId, WardId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IncidentId(pub String);

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Violence,
    Intimidation,
    VoteBuying,
    BallotSnatching,
    DeviceFailure,
    MissingMaterials,
    ResultManipulation,
    ObserverHarassment,
    Disagreement,
    Disruption,
}

impl IncidentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Violence => "Violence",
            Self::Intimidation => "Intimidation",
            Self::VoteBuying => "Vote buying",
            Self::BallotSnatching => "Ballot snatching",
            Self::DeviceFailure => "Device failure",
            Self::MissingMaterials => "Missing materials",
            Self::ResultManipulation => "Result manipulation",
            Self::ObserverHarassment => "Observer harassment",
            Self::Disagreement => "Disagreement",
            Self::Disruption => "Disruption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Lifecycle stage. Variant order is the only permitted direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Reported,
    Investigating,
    Resolved,
}

impl IncidentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reported => "Reported",
            Self::Investigating => "Investigating",
            Self::Resolved => "Resolved",
        }
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

/// Where an incident happened, always by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentLocation {
    pub lga_id: LgaId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<WardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_unit_id: Option<PollingUnitId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub title: String,
    pub description: String,
    pub location: IncidentLocation,
    pub reported_by: String,
    pub timestamp: DateTime<Utc>,
}

impl Incident {
    /// Moves the incident forward in its lifecycle; staying put or going back is refused.
    pub fn advance(&mut self, next: IncidentStatus) -> Result<IncidentStatus, IncidentError> {
        if next <= self.status {
            return Err(IncidentError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let previous = self.status;
        self.status = next;
        Ok(previous)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncidentError {
    #[error("incident cannot move from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },
}

/// Incident intake payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub severity: IncidentSeverity,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: IncidentLocation,
    #[serde(default)]
    pub reported_by: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentQuery {
    #[serde(default)]
    pub lga_id: Option<LgaId>,
    #[serde(default, rename = "type")]
    pub kind: Option<IncidentType>,
    #[serde(default)]
    pub status: Option<IncidentStatus>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl IncidentQuery {
    pub fn matches(&self, incident: &Incident) -> bool {
        self.lga_id
            .as_ref()
            .map_or(true, |lga| &incident.location.lga_id == lga)
            && self.kind.map_or(true, |kind| incident.kind == kind)
            && self.status.map_or(true, |status| incident.status == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentFeed {
    pub incidents: Vec<Incident>,
    pub active_incidents: usize,
    pub resolved_incidents: usize,
}

impl IncidentFeed {
    /// Newest first. Counts cover every matching incident, not just the returned page.
    pub fn build(incidents: &[Incident], query: &IncidentQuery) -> Self {
        let mut matching: Vec<Incident> = incidents
            .iter()
            .filter(|incident| query.matches(incident))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));

        let active_incidents = matching
            .iter()
            .filter(|incident| incident.status.is_active())
            .count();
        let resolved_incidents = matching.len() - active_incidents;

        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }

        Self {
            incidents: matching,
            active_incidents,
            resolved_incidents,
        }
    }
}
