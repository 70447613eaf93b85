use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the monitoring service and its watcher.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub poll: PollConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let session_ttl_minutes =
            parse_positive("APP_SESSION_TTL_MINUTES", 720, ConfigError::InvalidSessionTtl)?;
        let admin_username =
            env::var("APP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = env::var("APP_ADMIN_PASSWORD")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let interval_secs =
            parse_positive("APP_POLL_INTERVAL_SECS", 30, ConfigError::InvalidPollInterval)?;
        let timeout_secs =
            parse_positive("APP_POLL_TIMEOUT_SECS", 10, ConfigError::InvalidPollTimeout)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig {
                session_ttl_minutes,
                admin_username,
                admin_password,
            },
            poll: PollConfig {
                interval_secs,
                timeout_secs,
            },
        })
    }
}

fn parse_positive(key: &str, default: u64, error: ConfigError) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(error),
        },
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Session lifetime and the optional bootstrap administrator.
#[derive(Clone)]
pub struct AuthConfig {
    pub session_ttl_minutes: u64,
    pub admin_username: String,
    pub admin_password: Option<String>,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::try_from(self.session_ttl_minutes).unwrap_or(i64::MAX))
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Dashboard refresh cadence used by the watcher.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionTtl,
    InvalidPollInterval,
    InvalidPollTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "APP_SESSION_TTL_MINUTES must be a positive integer")
            }
            ConfigError::InvalidPollInterval => {
                write!(f, "APP_POLL_INTERVAL_SECS must be a positive integer")
            }
            ConfigError::InvalidPollTimeout => {
                write!(f, "APP_POLL_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_SESSION_TTL_MINUTES",
            "APP_ADMIN_USERNAME",
            "APP_ADMIN_PASSWORD",
            "APP_POLL_INTERVAL_SECS",
            "APP_POLL_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.auth.session_ttl_minutes, 720);
        assert_eq!(config.auth.admin_username, "admin");
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.poll.interval(), Duration::from_secs(30));
        assert_eq!(config.poll.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_POLL_INTERVAL_SECS", "0");
        let err = AppConfig::load().expect_err("zero interval rejected");
        assert!(matches!(err, ConfigError::InvalidPollInterval));
        reset_env();
    }

    #[test]
    fn blank_admin_password_disables_bootstrap() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ADMIN_PASSWORD", "  ");
        let config = AppConfig::load().expect("config loads");
        assert!(config.auth.admin_password.is_none());
        assert!(!format!("{:?}", config.auth).contains("  "));
        reset_env();
    }
}
