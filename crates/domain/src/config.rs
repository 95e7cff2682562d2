//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS, LOGIN_PATH, REFRESH_PATH, SIGN_IN_REDIRECT,
    TOKEN_POLL_INTERVAL_MS, TOKEN_WAIT_TIMEOUT_MS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    pub base_url: String,
    /// Path of the token refresh endpoint
    pub refresh_path: String,
    /// Path of the login endpoint
    pub login_path: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            refresh_path: REFRESH_PATH.to_string(),
            login_path: LOGIN_PATH.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

/// Token gate and session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long a request waits for a token before failing
    pub token_wait_timeout_ms: u64,
    /// Interval between token availability checks
    pub token_poll_interval_ms: u64,
    /// Redirect target handed to the session terminator
    pub sign_in_redirect: String,
    /// Where the session snapshot is persisted; in-memory only when unset
    pub session_file: Option<String>,
}

impl AuthConfig {
    #[must_use]
    pub const fn token_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.token_wait_timeout_ms)
    }

    #[must_use]
    pub const fn token_poll_interval(&self) -> Duration {
        Duration::from_millis(self.token_poll_interval_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_wait_timeout_ms: TOKEN_WAIT_TIMEOUT_MS,
            token_poll_interval_ms: TOKEN_POLL_INTERVAL_MS,
            sign_in_redirect: SIGN_IN_REDIRECT.to_string(),
            session_file: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// Structured JSON for log shippers
    Json,
    /// Single-line output
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level for VoiceDash crates (`trace`..`error`)
    pub level: String,
    pub format: LogFormat,
    /// Full `EnvFilter` directive; overrides `level` when set
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::default(), filter: None }
    }
}
