//! Accounts, bearer sessions, role checks, and the audit trail for data-entry staff.

mod password;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::monitoring::repository::RepositoryError;

pub use password::{hash_password, verify_password, HashError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }

    /// Admins may do anything an editor may.
    pub const fn permits(self, required: Role) -> bool {
        matches!((self, required), (Self::Admin, _) | (Self::Editor, Self::Editor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Stored account. The hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    pub username: String,
    pub action: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Storage for accounts, live sessions, and the audit log.
pub trait AccountRepository: Send + Sync {
    fn insert_user(&self, account: UserAccount) -> Result<(), RepositoryError>;
    fn user(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn users(&self) -> Result<Vec<User>, RepositoryError>;
    fn insert_session(&self, session: Session) -> Result<(), RepositoryError>;
    fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError>;
    /// Drops every session expired at `now` and returns how many went.
    fn prune_sessions(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError>;
    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError>;
    /// Newest first, at most `limit` entries.
    fn audit_logs(&self, limit: usize) -> Result<Vec<AuditEntry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("session expired")]
    Expired,
    #[error("{} role required", required.label())]
    Forbidden { required: Role },
    #[error("user {0} already exists")]
    Conflict(String),
    #[error("invalid user: {0}")]
    InvalidUser(String),
    #[error("password hashing failed: {0}")]
    Hashing(HashError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub const AUDIT_LOG_LIMIT: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static AUDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub struct AuthService<A> {
    accounts: Arc<A>,
    session_ttl: Duration,
}

impl<A> AuthService<A>
where
    A: AccountRepository + 'static,
{
    pub fn new(accounts: Arc<A>, session_ttl: Duration) -> Self {
        Self {
            accounts,
            session_ttl,
        }
    }

    /// Creates the configured administrator unless an account with that name exists.
    pub fn bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        if self.accounts.user(username)?.is_some() {
            return Ok(false);
        }
        self.create_user(NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role: Role::Admin,
        })?;
        info!(%username, "bootstrap administrator created");
        Ok(true)
    }

    pub fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::InvalidUser("username must not be blank".to_string()));
        }
        if new_user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidUser(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = User {
            id: USER_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            username: username.clone(),
            role: new_user.role,
            created_at: Utc::now(),
        };
        let account = UserAccount {
            user: user.clone(),
            password_hash: hash_password(&new_user.password).map_err(AuthError::Hashing)?,
        };
        match self.accounts.insert_user(account) {
            Ok(()) => Ok(user),
            Err(RepositoryError::Conflict) => Err(AuthError::Conflict(username)),
            Err(other) => Err(other.into()),
        }
    }

    pub fn login(&self, request: &LoginRequest, now: DateTime<Utc>) -> Result<LoginResponse, AuthError> {
        let account = self
            .accounts
            .user(request.username.trim())?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&request.password, &account.password_hash) {
            warn!(username = %account.user.username, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let pruned = self.accounts.prune_sessions(now)?;
        if pruned > 0 {
            info!(pruned, "expired sessions dropped");
        }

        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            username: account.user.username.clone(),
            role: account.user.role,
            issued_at: now,
            expires_at: now + self.session_ttl,
        };
        self.accounts.insert_session(session.clone())?;
        info!(username = %session.username, role = session.role.label(), "user logged in");

        Ok(LoginResponse {
            token: session.token,
            user: account.user,
            expires_at: session.expires_at,
        })
    }

    pub fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let session = self
            .accounts
            .session(token)?
            .ok_or(AuthError::InvalidToken)?;
        if session.is_expired(now) {
            self.accounts.prune_sessions(now)?;
            return Err(AuthError::Expired);
        }
        Ok(session)
    }

    /// Resolves the bearer token on a request and checks the caller's role.
    pub fn authorize(&self, headers: &HeaderMap, required: Role) -> Result<Session, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let session = self.authenticate(token, Utc::now())?;
        if !session.role.permits(required) {
            return Err(AuthError::Forbidden { required });
        }
        Ok(session)
    }

    pub fn record(
        &self,
        username: &str,
        action: &str,
        details: impl Into<String>,
        ip_address: Option<String>,
    ) -> Result<(), AuthError> {
        self.accounts.append_audit(AuditEntry {
            id: AUDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            username: username.to_string(),
            action: action.to_string(),
            details: details.into(),
            ip_address,
            timestamp: Utc::now(),
        })?;
        Ok(())
    }

    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.accounts.users()?)
    }

    pub fn audit_logs(&self) -> Result<Vec<AuditEntry>, AuthError> {
        Ok(self.accounts.audit_logs(AUDIT_LOG_LIMIT)?)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Client address as reported by a fronting proxy, if any.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Accounts {
        users: Mutex<HashMap<String, UserAccount>>,
        sessions: Mutex<HashMap<String, Session>>,
        audit: Mutex<Vec<AuditEntry>>,
    }

    impl AccountRepository for Accounts {
        fn insert_user(&self, account: UserAccount) -> Result<(), RepositoryError> {
            let mut guard = self.users.lock().expect("users mutex poisoned");
            if guard.contains_key(&account.user.username) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(account.user.username.clone(), account);
            Ok(())
        }

        fn user(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
            Ok(self.users.lock().expect("users mutex poisoned").get(username).cloned())
        }

        fn users(&self) -> Result<Vec<User>, RepositoryError> {
            let guard = self.users.lock().expect("users mutex poisoned");
            Ok(guard.values().map(|account| account.user.clone()).collect())
        }

        fn insert_session(&self, session: Session) -> Result<(), RepositoryError> {
            self.sessions
                .lock()
                .expect("sessions mutex poisoned")
                .insert(session.token.clone(), session);
            Ok(())
        }

        fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
            Ok(self.sessions.lock().expect("sessions mutex poisoned").get(token).cloned())
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

    fn service() -> AuthService<Accounts> {
        AuthService::new(Arc::new(Accounts::default()), Duration::minutes(30))
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
        );
        headers
    }

    #[test]
    fn admin_permits_editor_actions_but_not_reverse() {
        assert!(Role::Admin.permits(Role::Editor));
        assert!(Role::Editor.permits(Role::Editor));
        assert!(!Role::Editor.permits(Role::Admin));
    }

    #[test]
    fn login_issues_session_that_expires() {
        let auth = service();
        assert!(auth.bootstrap_admin("admin", "wardcollation").expect("bootstrap"));
        assert!(!auth.bootstrap_admin("admin", "wardcollation").expect("second bootstrap"));

        let now = Utc::now();
        let response = auth
            .login(
                &LoginRequest {
                    username: "admin".to_string(),
                    password: "wardcollation".to_string(),
                },
                now,
            )
            .expect("login succeeds");
        assert_eq!(response.user.role, Role::Admin);

        let session = auth.authenticate(&response.token, now).expect("valid session");
        assert_eq!(session.username, "admin");
        assert!(matches!(
            auth.authenticate(&response.token, now + Duration::minutes(31)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn expired_sessions_are_dropped_from_storage() {
        let accounts = Arc::new(Accounts::default());
        let auth = AuthService::new(Arc::clone(&accounts), Duration::minutes(30));
        auth.bootstrap_admin("admin", "wardcollation").expect("bootstrap");
        let credentials = LoginRequest {
            username: "admin".to_string(),
            password: "wardcollation".to_string(),
        };

        let now = Utc::now();
        let first = auth.login(&credentials, now).expect("first login");
        let second = auth.login(&credentials, now).expect("second login");
        assert_eq!(accounts.sessions.lock().expect("sessions").len(), 2);

        let later = now + Duration::minutes(31);
        assert!(matches!(
            auth.authenticate(&first.token, later),
            Err(AuthError::Expired)
        ));
        assert!(accounts.sessions.lock().expect("sessions").is_empty());
        assert!(matches!(
            auth.authenticate(&second.token, later),
            Err(AuthError::InvalidToken)
        ));

        let fresh = auth.login(&credentials, later).expect("login after expiry");
        assert_eq!(accounts.sessions.lock().expect("sessions").len(), 1);
        assert!(auth.authenticate(&fresh.token, later).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = service();
        auth.bootstrap_admin("admin", "wardcollation").expect("bootstrap");
        let result = auth.login(
            &LoginRequest {
                username: "admin".to_string(),
                password: "guess".to_string(),
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn editors_are_forbidden_from_admin_routes() {
        let auth = service();
        auth.create_user(NewUser {
            username: "editor1".to_string(),
            password: "observer-pass".to_string(),
            role: Role::Editor,
        })
        .expect("editor created");
        let response = auth
            .login(
                &LoginRequest {
                    username: "editor1".to_string(),
                    password: "observer-pass".to_string(),
                },
                Utc::now(),
            )
            .expect("login");
        let headers = headers_with(&response.token);
        assert!(auth.authorize(&headers, Role::Editor).is_ok());
        assert!(matches!(
            auth.authorize(&headers, Role::Admin),
            Err(AuthError::Forbidden { required: Role::Admin })
        ));
        assert!(matches!(
            auth.authorize(&HeaderMap::new(), Role::Editor),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn duplicate_usernames_conflict() {
        let auth = service();
        let new_user = || NewUser {
            username: "editor1".to_string(),
            password: "observer-pass".to_string(),
            role: Role::Editor,
        };
        auth.create_user(new_user()).expect("first");
        assert!(matches!(auth.create_user(new_user()), Err(AuthError::Conflict(_))));
    }

    #[test]
    fn audit_log_lists_newest_first() {
        let auth = service();
        auth.record("admin", "LOGIN", "User logged in", None)
            .expect("first entry");
        auth.record("admin", "CREATE_USER", "Created user editor1", Some("10.0.0.7".to_string()))
            .expect("second entry");
        let logs = auth.audit_logs().expect("audit logs");
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "CREATE_USER");
        assert_eq!(logs[0].ip_address.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.7, 172.16.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.7"));
        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
