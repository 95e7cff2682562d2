//! API-specific error types
//!
//! Provides error classification for API operations. Every authentication
//! failure maps to HTTP 401 through [`ApiError::status`] so callers can
//! handle "never had a token", "refresh rejected" and a plain 401 the same
//! way.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use voicedash_domain::VoiceDashError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// The session is not (or no longer) authenticated
    Authentication,
    /// Rate limiting errors (429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Network/connection errors and timeouts
    Network,
    /// Configuration errors
    Config,
}

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication unavailable: no access token after {waited:?}")]
    AuthenticationUnavailable { waited: Duration },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The refresh owner went away before settling; the session is intact
    #[error("Token refresh abandoned")]
    RefreshAbandoned,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Upstream returned status {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status equivalent of this error, when one exists
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::AuthenticationUnavailable { .. }
            | Self::RefreshFailed(_)
            | Self::RefreshAbandoned
            | Self::Unauthorized(_)
            | Self::Auth(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Upstream { status, .. } => Some(*status),
            Self::Timeout(_) => Some(StatusCode::GATEWAY_TIMEOUT),
            Self::Network(_) | Self::Client(_) | Self::Config(_) => None,
        }
    }

    /// Whether callers should treat this as an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the session was terminated because of this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::AuthenticationUnavailable { .. }
            | Self::RefreshFailed(_)
            | Self::RefreshAbandoned
            | Self::Unauthorized(_)
            | Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Upstream { status, .. } => {
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN {
                    ApiErrorCategory::Authentication
                } else if *status == StatusCode::TOO_MANY_REQUESTS {
                    ApiErrorCategory::RateLimit
                } else if status.is_server_error() {
                    ApiErrorCategory::Server
                } else {
                    ApiErrorCategory::Client
                }
            }
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }
}

impl From<VoiceDashError> for ApiError {
    fn from(err: VoiceDashError) -> Self {
        match err {
            VoiceDashError::Config(message) => Self::Config(message),
            VoiceDashError::Network(message) => Self::Network(message),
            VoiceDashError::Auth(message) => Self::Auth(message),
            VoiceDashError::Storage(message)
            | VoiceDashError::InvalidInput(message)
            | VoiceDashError::Internal(message) => Self::Client(message),
        }
    }
}
