//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for VoiceDash
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum VoiceDashError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for VoiceDash operations
pub type Result<T> = std::result::Result<T, VoiceDashError>;

impl From<serde_json::Error> for VoiceDashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("Invalid session payload: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = VoiceDashError::Auth("token missing".to_string());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "Auth");
        assert_eq!(json["message"], "token missing");
    }

    #[test]
    fn json_errors_map_to_storage() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: VoiceDashError = parse_err.into();
        assert!(matches!(err, VoiceDashError::Storage(_)));
    }
}
