use abuja_watch::auth::{AccountRepository, AuditEntry, Session, User, UserAccount};
use abuja_watch::monitoring::{
    AreaCouncil, ElectionRepository, Incident, IncidentId, LgaId, Party, PollingUnit,
    RepositoryError, Territory, Ward, WardId, WardRecord,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{what} lock poisoned")))
}

/// Process-local election store seeded with the FCT territory.
#[derive(Clone)]
pub(crate) struct InMemoryElectionRepository {
    territory: Arc<Territory>,
    records: Arc<Mutex<HashMap<WardId, WardRecord>>>,
    polling_units: Arc<Mutex<HashMap<WardId, Vec<PollingUnit>>>>,
    incidents: Arc<Mutex<Vec<Incident>>>,
    parties: Arc<Mutex<HashMap<LgaId, Vec<Party>>>>,
}

impl InMemoryElectionRepository {
    pub(crate) fn new(territory: Territory) -> Self {
        Self {
            territory: Arc::new(territory),
            records: Arc::default(),
            polling_units: Arc::default(),
            incidents: Arc::default(),
            parties: Arc::default(),
        }
    }
}

impl Default for InMemoryElectionRepository {
    fn default() -> Self {
        Self::new(Territory::fct())
    }
}

impl ElectionRepository for InMemoryElectionRepository {
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
        Ok(lock(&self.records, "ward records")?.get(ward_id).cloned())
    }

    fn update_ward_record<F>(&self, ward_id: &WardId, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut WardRecord),
    {
        let mut guard = lock(&self.records, "ward records")?;
        let record = guard
            .entry(ward_id.clone())
            .or_insert_with(|| WardRecord::new(ward_id.clone(), Utc::now()));
        apply(record);
        Ok(())
    }

    fn polling_units(&self, ward_id: &WardId) -> Result<Vec<PollingUnit>, RepositoryError> {
        Ok(lock(&self.polling_units, "polling units")?
            .get(ward_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_polling_unit(&self, unit: PollingUnit) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.polling_units, "polling units")?;
        let units = guard.entry(unit.ward_id.clone()).or_default();
        match units.iter_mut().find(|existing| existing.id == unit.id) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
        Ok(())
    }

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError> {
        Ok(lock(&self.incidents, "incidents")?.clone())
    }

    fn incident(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError> {
        Ok(lock(&self.incidents, "incidents")?
            .iter()
            .find(|incident| &incident.id == id)
            .cloned())
    }

    fn insert_incident(&self, incident: Incident) -> Result<Incident, RepositoryError> {
        let mut guard = lock(&self.incidents, "incidents")?;
        if guard.iter().any(|existing| existing.id == incident.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(incident.clone());
        Ok(incident)
    }

    fn update_incident(&self, incident: Incident) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.incidents, "incidents")?;
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == incident.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = incident;
        Ok(())
    }

    fn parties(&self, lga_id: &LgaId) -> Result<Option<Vec<Party>>, RepositoryError> {
        Ok(lock(&self.parties, "parties")?.get(lga_id).cloned())
    }

    fn set_parties(&self, lga_id: &LgaId, parties: Vec<Party>) -> Result<(), RepositoryError> {
        lock(&self.parties, "parties")?.insert(lga_id.clone(), parties);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountRepository {
    users: Arc<Mutex<HashMap<String, UserAccount>>>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    audit: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AccountRepository for InMemoryAccountRepository {
    fn insert_user(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.users, "users")?;
        if guard.contains_key(&account.user.username) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.user.username.clone(), account);
        Ok(())
    }

    fn user(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(lock(&self.users, "users")?.get(username).cloned())
    }

    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        let guard = lock(&self.users, "users")?;
        let mut users: Vec<User> = guard.values().map(|account| account.user.clone()).collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    fn insert_session(&self, session: Session) -> Result<(), RepositoryError> {
        lock(&self.sessions, "sessions")?.insert(session.token.clone(), session);
        Ok(())
    }

    fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        Ok(lock(&self.sessions, "sessions")?.get(token).cloned())
    }

    fn prune_sessions(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.sessions, "sessions")?;
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired(now));
        Ok(before - guard.len())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        lock(&self.audit, "audit log")?.push(entry);
        Ok(())
    }

    fn audit_logs(&self, limit: usize) -> Result<Vec<AuditEntry>, RepositoryError> {
        let guard = lock(&self.audit, "audit log")?;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}
