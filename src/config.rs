//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Destination used when `PLANNER_ONBOARDING_REDIRECT` is unset.
pub const DEFAULT_ONBOARDING_REDIRECT: &str = "/calendar";
/// Minutes an onboarding session may sit untouched before it is dropped.
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 30;

/// Planner configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Base URL of the persistence backend's REST API.
    pub backend_url: String,
    /// API key sent with every backend request.
    pub backend_key: SecretString,
    /// Where the browser is sent once all onboarding workouts are saved.
    pub onboarding_redirect: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Idle time after which an unfinished onboarding session is dropped.
    pub session_max_idle: chrono::Duration,
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = std::env::var("PLANNER_BACKEND_URL")
            .map_err(|_| ConfigError::MissingEnvVar("PLANNER_BACKEND_URL".to_string()))?;
        let backend_url = backend_url.trim_end_matches('/').to_string();
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "PLANNER_BACKEND_URL".to_string(),
                message: format!("expected an http(s) URL, got {backend_url:?}"),
            });
        }

        let backend_key = std::env::var("PLANNER_BACKEND_KEY")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("PLANNER_BACKEND_KEY".to_string()))?;

        let onboarding_redirect = std::env::var("PLANNER_ONBOARDING_REDIRECT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ONBOARDING_REDIRECT.to_string());

        let port = match std::env::var("PLANNER_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PLANNER_PORT".to_string(),
                message: format!("{raw:?} is not a valid port"),
            })?,
            Err(_) => 8080,
        };

        let idle_minutes = match std::env::var("PLANNER_SESSION_IDLE_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "PLANNER_SESSION_IDLE_MINUTES".to_string(),
                    message: format!("{raw:?} is not a positive number of minutes"),
                })?,
            Err(_) => DEFAULT_SESSION_IDLE_MINUTES,
        };

        Ok(Self {
            backend_url,
            backend_key,
            onboarding_redirect,
            port,
            session_max_idle: chrono::Duration::minutes(idle_minutes),
        })
    }
}
