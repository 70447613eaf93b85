use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::auth::{
    AccountRepository, AuditEntry, AuthService, LoginRequest, NewUser, Role, Session, User,
    UserAccount,
};
use crate::monitoring::domain::{
    ArrivalTimeCategory, AreaCouncil, CollationStartCategory, LgaId, Party, PollingUnit, Ward,
    WardId,
};
use crate::monitoring::incidents::{Incident, IncidentId};
use crate::monitoring::repository::{ElectionRepository, RepositoryError, WardRecord};
use crate::monitoring::submissions::{
    IntegritySubmission, LogisticsSubmission, ObservationSubmission, ResultsSubmission,
    StaffingSubmission,
};
use crate::monitoring::{monitoring_router, ApiState, MonitoringService, Territory};

pub(super) const ADMIN_PASSWORD: &str = "situation-room";
pub(super) const EDITOR_PASSWORD: &str = "ward-observer";

#[derive(Clone)]
pub(super) struct MemoryRepository {
    territory: Arc<Territory>,
    records: Arc<Mutex<HashMap<WardId, WardRecord>>>,
    polling_units: Arc<Mutex<Vec<PollingUnit>>>,
    incidents: Arc<Mutex<Vec<Incident>>>,
    parties: Arc<Mutex<HashMap<LgaId, Vec<Party>>>>,
    write_delay: Option<std::time::Duration>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self {
            territory: Arc::new(Territory::fct()),
            records: Arc::default(),
            polling_units: Arc::default(),
            incidents: Arc::default(),
            parties: Arc::default(),
            write_delay: None,
        }
    }
}

impl MemoryRepository {
    /// Holds each ward record write open for `delay` so overlapping writers collide.
    pub(super) fn with_write_delay(delay: std::time::Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }
}

impl ElectionRepository for MemoryRepository {
    fn area_councils(&self) -> Result<Vec<AreaCouncil>, RepositoryError> {
        Ok(self.territory.councils.clone())
    }

    fn wards(&self, lga_id: &LgaId) -> Result<Vec<Ward>, RepositoryError> {
        Ok(self.territory.wards_in(lga_id).cloned().collect())
    }

    fn ward(&self, ward_id: &WardId) -> Result<Option<Ward>, RepositoryError> {
        Ok(self
            .territory
            .wards
            .iter()
            .find(|ward| &ward.id == ward_id)
            .cloned())
    }

    fn ward_record(&self, ward_id: &WardId) -> Result<Option<WardRecord>, RepositoryError> {
        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.get(ward_id).cloned())
    }

    fn update_ward_record<F>(&self, ward_id: &WardId, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut WardRecord),
    {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        let record = guard
            .entry(ward_id.clone())
            .or_insert_with(|| WardRecord::new(ward_id.clone(), Utc::now()));
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        apply(record);
        Ok(())
    }

    fn polling_units(&self, ward_id: &WardId) -> Result<Vec<PollingUnit>, RepositoryError> {
        let guard = self.polling_units.lock().expect("units mutex poisoned");
        Ok(guard
            .iter()
            .filter(|unit| &unit.ward_id == ward_id)
            .cloned()
            .collect())
    }

    fn upsert_polling_unit(&self, unit: PollingUnit) -> Result<(), RepositoryError> {
        let mut guard = self.polling_units.lock().expect("units mutex poisoned");
        guard.retain(|existing| existing.id != unit.id);
        guard.push(unit);
        Ok(())
    }

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError> {
        Ok(self.incidents.lock().expect("incidents mutex poisoned").clone())
    }

    fn incident(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError> {
        let guard = self.incidents.lock().expect("incidents mutex poisoned");
        Ok(guard.iter().find(|incident| &incident.id == id).cloned())
    }

    fn insert_incident(&self, incident: Incident) -> Result<Incident, RepositoryError> {
        let mut guard = self.incidents.lock().expect("incidents mutex poisoned");
        if guard.iter().any(|existing| existing.id == incident.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(incident.clone());
        Ok(incident)
    }

    fn update_incident(&self, incident: Incident) -> Result<(), RepositoryError> {
        let mut guard = self.incidents.lock().expect("incidents mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == incident.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = incident;
        Ok(())
    }

    fn parties(&self, lga_id: &LgaId) -> Result<Option<Vec<Party>>, RepositoryError> {
        let guard = self.parties.lock().expect("parties mutex poisoned");
        Ok(guard.get(lga_id).cloned())
    }

    fn set_parties(&self, lga_id: &LgaId, parties: Vec<Party>) -> Result<(), RepositoryError> {
        let mut guard = self.parties.lock().expect("parties mutex poisoned");
        guard.insert(lga_id.clone(), parties);
        Ok(())
    }
}

/// Repository whose storage is offline.
pub(super) struct UnavailableRepository;

impl ElectionRepository for UnavailableRepository {
    fn area_councils(&self) -> Result<Vec<AreaCouncil>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn wards(&self, _lga_id: &LgaId) -> Result<Vec<Ward>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn ward(&self, _ward_id: &WardId) -> Result<Option<Ward>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn ward_record(&self, _ward_id: &WardId) -> Result<Option<WardRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_ward_record<F>(&self, _ward_id: &WardId, _apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut WardRecord),
    {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn polling_units(&self, _ward_id: &WardId) -> Result<Vec<PollingUnit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_polling_unit(&self, _unit: PollingUnit) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn incident(&self, _id: &IncidentId) -> Result<Option<Incident>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_incident(&self, _incident: Incident) -> Result<Incident, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_incident(&self, _incident: Incident) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn parties(&self, _lga_id: &LgaId) -> Result<Option<Vec<Party>>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_parties(&self, _lga_id: &LgaId, _parties: Vec<Party>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAccounts {
    users: Arc<Mutex<HashMap<String, UserAccount>>>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    audit: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAccounts {
    pub(super) fn audit_actions(&self) -> Vec<String> {
        let guard = self.audit.lock().expect("audit mutex poisoned");
        guard.iter().map(|entry| entry.action.clone()).collect()
    }
}

impl AccountRepository for MemoryAccounts {
    fn insert_user(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = self.users.lock().expect("users mutex poisoned");
        if guard.contains_key(&account.user.username) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.user.username.clone(), account);
        Ok(())
    }

    fn user(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.users.lock().expect("users mutex poisoned");
        Ok(guard.get(username).cloned())
    }

    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        let guard = self.users.lock().expect("users mutex poisoned");
        let mut users: Vec<User> = guard.values().map(|account| account.user.clone()).collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    fn insert_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(session.token.clone(), session);
        Ok(())
    }

    fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.get(token).cloned())
    }

    fn prune_sessions(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired(now));
        Ok(before - guard.len())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.audit.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }

    fn audit_logs(&self, limit: usize) -> Result<Vec<AuditEntry>, RepositoryError> {
        let guard = self.audit.lock().expect("audit mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

pub(super) fn build_service() -> (MonitoringService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = MonitoringService::new(repository.clone());
    (service, repository)
}

/// Auth service with an `admin` and an `editor1` account.
pub(super) fn build_auth() -> (AuthService<MemoryAccounts>, Arc<MemoryAccounts>) {
    let accounts = Arc::new(MemoryAccounts::default());
    let auth = AuthService::new(accounts.clone(), Duration::minutes(60));
    auth.bootstrap_admin("admin", ADMIN_PASSWORD)
        .expect("admin bootstrapped");
    auth.create_user(NewUser {
        username: "editor1".to_string(),
        password: EDITOR_PASSWORD.to_string(),
        role: Role::Editor,
    })
    .expect("editor created");
    (auth, accounts)
}

pub(super) fn build_state() -> (
    ApiState<MemoryRepository, MemoryAccounts>,
    Arc<MemoryRepository>,
    Arc<MemoryAccounts>,
) {
    let (service, repository) = build_service();
    let (auth, accounts) = build_auth();
    let state = ApiState::new(Arc::new(service), Arc::new(auth));
    (state, repository, accounts)
}

pub(super) fn router_with_state(state: ApiState<MemoryRepository, MemoryAccounts>) -> axum::Router {
    monitoring_router(state)
}

pub(super) fn token_for(
    state: &ApiState<MemoryRepository, MemoryAccounts>,
    username: &str,
    password: &str,
) -> String {
    state
        .auth
        .login(
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
            Utc::now(),
        )
        .expect("login succeeds")
        .token
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("valid json")
}

pub(super) fn ward(id: &str) -> WardId {
    WardId::new(id)
}

pub(super) fn on_time_logistics(ward_id: &str) -> LogisticsSubmission {
    LogisticsSubmission {
        ward_id: ward(ward_id),
        arrival_time: ArrivalTimeCategory::BeforeFourPm,
        collation_start_time: CollationStartCategory::FourToSixPm,
    }
}

pub(super) fn late_logistics(ward_id: &str) -> LogisticsSubmission {
    LogisticsSubmission {
        ward_id: ward(ward_id),
        arrival_time: ArrivalTimeCategory::AfterSixPm,
        collation_start_time: CollationStartCategory::NotStartedAtMidnight,
    }
}

pub(super) fn staffing(ward_id: &str, security_present: bool) -> StaffingSubmission {
    StaffingSubmission {
        ward_id: ward(ward_id),
        inec_staff: 6,
        female_inec_staff: Some(2),
        security_present,
        party_agents: 9,
    }
}

pub(super) fn clean_checklist(ward_id: &str) -> IntegritySubmission {
    IntegritySubmission {
        ward_id: ward(ward_id),
        ec8b_submitted: true,
        ec8c_collated: true,
        csrvs_done: true,
        votes_announced: true,
        agents_countersigned: true,
        ec60e_displayed: true,
        ec40g_transfers_done: None,
        ec40h_pwd_data_transferred: None,
        ec8c_copies_distributed: None,
    }
}

pub(super) fn results(ward_id: &str, votes: &[(Party, u64)], rejected: u64) -> ResultsSubmission {
    let party_votes = votes.iter().copied().collect();
    let valid: u64 = votes.iter().map(|(_, count)| count).sum();
    ResultsSubmission {
        ward_id: ward(ward_id),
        accredited_voters: valid + rejected,
        valid_votes: valid,
        rejected_votes: rejected,
        votes_cast: valid + rejected,
        party_votes,
    }
}

pub(super) fn observation(ward_id: &str, permitted: bool) -> ObservationSubmission {
    ObservationSubmission {
        ward_id: ward(ward_id),
        permitted_to_observe: permitted,
        denial_reason: (!permitted).then(|| "turned away at the gate".to_string()),
        disagreement_with_results: false,
        intimidation_or_harassment: false,
        attempted_disruption: false,
        incident_details: None,
        cancelled_pus: 0,
        registered_voters_in_cancelled_pus: 0,
        countersignatures: None,
    }
}
