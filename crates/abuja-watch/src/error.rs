use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::monitoring::MonitoringServiceError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Monitoring(MonitoringServiceError),
    Auth(AuthError),
    Watch(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Monitoring(err) => write!(f, "monitoring error: {}", err),
            AppError::Auth(err) => write!(f, "auth error: {}", err),
            AppError::Watch(err) => write!(f, "watch error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Monitoring(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Watch(err) => Some(err.as_ref()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<MonitoringServiceError> for AppError {
    fn from(value: MonitoringServiceError) -> Self {
        Self::Monitoring(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn auth_failures_keep_their_source() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "auth error: invalid credentials");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("invalid credentials")
        );
    }
}
