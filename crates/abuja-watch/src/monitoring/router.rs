use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::dashboard::DashboardFilter;
use super::domain::{LgaId, Party, PollingUnit, WardId};
use super::incidents::{IncidentId, IncidentQuery, IncidentStatus, NewIncident};
use super::repository::{ElectionRepository, RepositoryError};
use super::service::{MonitoringService, MonitoringServiceError};
use super::submissions::{
    IntegritySubmission, LogisticsSubmission, ObservationSubmission, ResultsSubmission,
    StaffingSubmission,
};
use crate::auth::{client_ip, AccountRepository, AuthError, AuthService, LoginRequest, NewUser, Role};

/// Shared handles for the monitoring routes.
pub struct ApiState<R, A> {
    pub monitoring: Arc<MonitoringService<R>>,
    pub auth: Arc<AuthService<A>>,
}

impl<R, A> Clone for ApiState<R, A> {
    fn clone(&self) -> Self {
        Self {
            monitoring: Arc::clone(&self.monitoring),
            auth: Arc::clone(&self.auth),
        }
    }
}

impl<R, A> ApiState<R, A>
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    pub fn new(monitoring: Arc<MonitoringService<R>>, auth: Arc<AuthService<A>>) -> Self {
        Self { monitoring, auth }
    }

    /// Audit failures are logged; the mutation they describe has already happened.
    fn audit(&self, username: &str, headers: &HeaderMap, action: &str, details: String) {
        if let Err(error) = self
            .auth
            .record(username, action, details, client_ip(headers))
        {
            warn!(%error, action, "failed to append audit entry");
        }
    }
}

/// Router builder exposing the dashboard, data-entry, and administration endpoints.
pub fn monitoring_router<R, A>(state: ApiState<R, A>) -> Router
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    Router::new()
        .route("/", get(banner))
        .route("/api/login", post(login_handler::<R, A>))
        .route("/api/area-councils", get(area_councils_handler::<R, A>))
        .route(
            "/api/area-councils/:lga_id/wards",
            get(wards_handler::<R, A>),
        )
        .route(
            "/api/area-councils/:lga_id/parties",
            get(parties_handler::<R, A>).post(update_parties_handler::<R, A>),
        )
        .route("/api/wards/:ward_id", get(ward_handler::<R, A>))
        .route("/api/wards/:ward_id/risk", get(ward_risk_handler::<R, A>))
        .route(
            "/api/wards/:ward_id/polling-units",
            get(polling_units_handler::<R, A>),
        )
        .route("/api/dashboard/stats", get(dashboard_stats_handler::<R, A>))
        .route(
            "/api/dashboard/report",
            get(dashboard_report_handler::<R, A>),
        )
        .route(
            "/api/incidents",
            get(incident_feed_handler::<R, A>).post(report_incident_handler::<R, A>),
        )
        .route(
            "/api/incidents/:incident_id/status",
            post(incident_status_handler::<R, A>),
        )
        .route("/api/submit/logistics", post(submit_logistics_handler::<R, A>))
        .route("/api/submit/staffing", post(submit_staffing_handler::<R, A>))
        .route("/api/submit/integrity", post(submit_integrity_handler::<R, A>))
        .route("/api/submit/results", post(submit_results_handler::<R, A>))
        .route(
            "/api/submit/observation",
            post(submit_observation_handler::<R, A>),
        )
        .route(
            "/api/submit/polling-unit",
            post(submit_polling_unit_handler::<R, A>),
        )
        .route(
            "/api/users",
            get(list_users_handler::<R, A>).post(create_user_handler::<R, A>),
        )
        .route("/api/audit-logs", get(audit_logs_handler::<R, A>))
        .with_state(state)
}

/// Error surface shared by the monitoring handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitoring(#[from] MonitoringServiceError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Monitoring(error) => match error {
                MonitoringServiceError::UnknownAreaCouncil(_)
                | MonitoringServiceError::UnknownWard(_)
                | MonitoringServiceError::UnknownIncident(_)
                | MonitoringServiceError::Repository(RepositoryError::NotFound) => {
                    StatusCode::NOT_FOUND
                }
                MonitoringServiceError::Incident(_)
                | MonitoringServiceError::InvalidSubmission(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                MonitoringServiceError::Repository(RepositoryError::Conflict) => {
                    StatusCode::CONFLICT
                }
                MonitoringServiceError::Repository(RepositoryError::Unavailable(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Auth(error) => match error {
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::Expired => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
                AuthError::Conflict(_) => StatusCode::CONFLICT,
                AuthError::InvalidUser(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Hashing(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (self.status(), Json(payload)).into_response()
    }
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn banner() -> &'static str {
    "Abuja Watch election monitoring API"
}

pub(crate) async fn login_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state.auth.login(&request, Utc::now()).map_err(ApiError::from);
    if let Ok(response) = &result {
        state.audit(
            &response.user.username,
            &headers,
            "LOGIN",
            "User logged in".to_string(),
        );
    }
    respond(StatusCode::OK, result)
}

pub(crate) async fn area_councils_handler<R, A>(State(state): State<ApiState<R, A>>) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    respond(
        StatusCode::OK,
        state.monitoring.area_council_summaries().map_err(ApiError::from),
    )
}

pub(crate) async fn wards_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(lga_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let lga_id = LgaId(lga_id);
    respond(
        StatusCode::OK,
        state.monitoring.ward_summaries(&lga_id).map_err(ApiError::from),
    )
}

pub(crate) async fn ward_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(ward_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let ward_id = WardId(ward_id);
    respond(
        StatusCode::OK,
        state.monitoring.ward_summary(&ward_id).map_err(ApiError::from),
    )
}

pub(crate) async fn ward_risk_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(ward_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let ward_id = WardId(ward_id);
    respond(
        StatusCode::OK,
        state.monitoring.ward_risk(&ward_id).map_err(ApiError::from),
    )
}

pub(crate) async fn polling_units_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(ward_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let ward_id = WardId(ward_id);
    respond(
        StatusCode::OK,
        state.monitoring.polling_units(&ward_id).map_err(ApiError::from),
    )
}

pub(crate) async fn dashboard_stats_handler<R, A>(
    State(state): State<ApiState<R, A>>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    respond(
        StatusCode::OK,
        state.monitoring.dashboard_stats().map_err(ApiError::from),
    )
}

pub(crate) async fn dashboard_report_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Query(filter): Query<DashboardFilter>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    respond(
        StatusCode::OK,
        state
            .monitoring
            .dashboard_report(&filter)
            .map_err(ApiError::from),
    )
}

pub(crate) async fn parties_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(lga_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let lga_id = LgaId(lga_id);
    respond(
        StatusCode::OK,
        state.monitoring.parties(&lga_id).map_err(ApiError::from),
    )
}

pub(crate) async fn update_parties_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(lga_id): Path<String>,
    headers: HeaderMap,
    Json(parties): Json<Vec<Party>>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let lga_id = LgaId(lga_id);
    let result = state
        .auth
        .authorize(&headers, Role::Editor)
        .map_err(ApiError::from)
        .and_then(|session| {
            let parties = state.monitoring.set_parties(&lga_id, parties)?;
            let labels: Vec<&str> = parties.iter().map(|party| party.label()).collect();
            state.audit(
                &session.username,
                &headers,
                "UPDATE_PARTIES",
                format!("Set parties for {lga_id}: {}", labels.join(", ")),
            );
            Ok(parties)
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn incident_feed_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Query(query): Query<IncidentQuery>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    respond(
        StatusCode::OK,
        state.monitoring.incident_feed(&query).map_err(ApiError::from),
    )
}

pub(crate) async fn report_incident_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
    Json(incident): Json<NewIncident>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state
        .auth
        .authorize(&headers, Role::Editor)
        .map_err(ApiError::from)
        .and_then(|session| {
            let stored = state
                .monitoring
                .report_incident(incident, &session.username)?;
            state.audit(
                &session.username,
                &headers,
                "REPORT_INCIDENT",
                format!(
                    "Reported {} incident {} in {}",
                    stored.kind.label(),
                    stored.id,
                    stored.location.lga_id
                ),
            );
            Ok(stored)
        });
    respond(StatusCode::CREATED, result)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    status: IncidentStatus,
}

pub(crate) async fn incident_status_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    Path(incident_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let id = IncidentId(incident_id);
    let result = state
        .auth
        .authorize(&headers, Role::Editor)
        .map_err(ApiError::from)
        .and_then(|session| {
            let incident = state.monitoring.advance_incident(&id, update.status)?;
            state.audit(
                &session.username,
                &headers,
                "UPDATE_INCIDENT",
                format!("Incident {id} moved to {}", incident.status.label()),
            );
            Ok(incident)
        });
    respond(StatusCode::OK, result)
}

macro_rules! submission_handler {
    ($name:ident, $payload:ty, $method:ident, $action:literal) => {
        pub(crate) async fn $name<R, A>(
            State(state): State<ApiState<R, A>>,
            headers: HeaderMap,
            Json(submission): Json<$payload>,
        ) -> Response
        where
            R: ElectionRepository + 'static,
            A: AccountRepository + 'static,
        {
            let result = state
                .auth
                .authorize(&headers, Role::Editor)
                .map_err(ApiError::from)
                .and_then(|session| {
                    let receipt = state.monitoring.$method(submission, &session.username)?;
                    state.audit(
                        &session.username,
                        &headers,
                        $action,
                        format!("Submitted for ward {}", receipt.ward_id),
                    );
                    Ok(receipt)
                });
            respond(StatusCode::OK, result)
        }
    };
}

submission_handler!(
    submit_logistics_handler,
    LogisticsSubmission,
    submit_logistics,
    "SUBMIT_LOGISTICS"
);
submission_handler!(
    submit_staffing_handler,
    StaffingSubmission,
    submit_staffing,
    "SUBMIT_STAFFING"
);
submission_handler!(
    submit_integrity_handler,
    IntegritySubmission,
    submit_integrity,
    "SUBMIT_INTEGRITY"
);
submission_handler!(
    submit_results_handler,
    ResultsSubmission,
    submit_results,
    "SUBMIT_RESULTS"
);
submission_handler!(
    submit_observation_handler,
    ObservationSubmission,
    submit_observation,
    "SUBMIT_OBSERVATION"
);

pub(crate) async fn submit_polling_unit_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
    Json(unit): Json<PollingUnit>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state
        .auth
        .authorize(&headers, Role::Editor)
        .map_err(ApiError::from)
        .and_then(|session| {
            let unit = state.monitoring.report_polling_unit(unit)?;
            state.audit(
                &session.username,
                &headers,
                "SUBMIT_POLLING_UNIT",
                format!("Updated polling unit {} ({})", unit.id, unit.bvas_status.label()),
            );
            Ok(unit)
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_user_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
    Json(new_user): Json<NewUser>,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state
        .auth
        .authorize(&headers, Role::Admin)
        .and_then(|session| {
            let user = state.auth.create_user(new_user)?;
            state.audit(
                &session.username,
                &headers,
                "CREATE_USER",
                format!("Created user {} as {}", user.username, user.role.label()),
            );
            Ok(user)
        })
        .map_err(ApiError::from);
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_users_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state
        .auth
        .authorize(&headers, Role::Admin)
        .and_then(|_| state.auth.users())
        .map_err(ApiError::from);
    respond(StatusCode::OK, result)
}

pub(crate) async fn audit_logs_handler<R, A>(
    State(state): State<ApiState<R, A>>,
    headers: HeaderMap,
) -> Response
where
    R: ElectionRepository + 'static,
    A: AccountRepository + 'static,
{
    let result = state
        .auth
        .authorize(&headers, Role::Admin)
        .and_then(|_| state.auth.audit_logs())
        .map_err(ApiError::from);
    respond(StatusCode::OK, result)
}
