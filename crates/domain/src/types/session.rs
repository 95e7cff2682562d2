//! Session and credential types
//!
//! `Credentials` is the in-memory auth state read by the API client on every
//! request. `PersistedSession` is the subset written to local storage so a
//! reload can restore the session; it never carries a password.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credentials held for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Current access token (empty when signed out)
    pub access_token: String,
    /// Whether the token came from a successful login or refresh
    pub is_authenticated: bool,
}

impl Credentials {
    /// Create authenticated credentials for a token.
    #[must_use]
    pub fn authenticated(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), is_authenticated: true }
    }

    /// The access token, if one is present.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        if self.access_token.is_empty() {
            None
        } else {
            Some(self.access_token.as_str())
        }
    }

    /// Whether a non-empty token is held.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Session snapshot persisted across reloads.
///
/// Field names follow the layout the dashboard already writes to local
/// storage (`name`, `email`, `token`, `isAuth`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub token: String,
    #[serde(rename = "isAuth", default)]
    pub is_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedSession {
    /// Build a snapshot from the live session state.
    #[must_use]
    pub fn capture(credentials: &Credentials, profile: Option<&UserProfile>) -> Self {
        Self {
            name: profile.and_then(|p| p.name.clone()),
            email: profile.and_then(|p| p.email.clone()),
            token: credentials.access_token.clone(),
            is_auth: credentials.is_authenticated,
            saved_at: Some(Utc::now()),
        }
    }

    /// Split the snapshot back into credentials and profile.
    #[must_use]
    pub fn into_parts(self) -> (Credentials, Option<UserProfile>) {
        let profile = if self.name.is_some() || self.email.is_some() {
            Some(UserProfile { name: self.name, email: self.email })
        } else {
            None
        };

        (Credentials { access_token: self.token, is_authenticated: self.is_auth }, profile)
    }
}
