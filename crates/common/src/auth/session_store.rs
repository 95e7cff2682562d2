//! Session store with optional file persistence
//!
//! Holds the live [`Credentials`] and [`UserProfile`] behind a Tokio
//! `RwLock`. When constructed with [`SessionStore::persistent`], every change
//! is mirrored to a JSON file in the [`PersistedSession`] layout and
//! [`SessionStore::hydrate`] restores it on the next start.
//!
//! The in-memory state is authoritative: a failed file write is logged and
//! the session keeps working for the lifetime of the process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use voicedash_domain::{Credentials, PersistedSession, Result, UserProfile, VoiceDashError};

use super::traits::CredentialStore;

#[derive(Debug, Default)]
struct SessionState {
    credentials: Credentials,
    profile: Option<UserProfile>,
}

/// Credential store backing the API client
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a store that lives only in memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self { state: RwLock::new(SessionState::default()), path: None }
    }

    /// Create a store mirrored to `path`
    ///
    /// Nothing is read until [`hydrate`](Self::hydrate) is called.
    #[must_use]
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self { state: RwLock::new(SessionState::default()), path: Some(path.into()) }
    }

    /// Location of the persisted session, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Restore the persisted session into memory
    ///
    /// Credentials written after construction (e.g. a login that finished
    /// first) take precedence over the file.
    ///
    /// # Returns
    /// `true` if a session was restored, `false` if there was nothing to load
    ///
    /// # Errors
    /// Returns `VoiceDashError::Storage` if the file exists but cannot be
    /// read or parsed
    pub async fn hydrate(&self) -> Result<bool> {
        let Some(path) = self.path.as_ref() else {
            return Ok(false);
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted session found");
                return Ok(false);
            }
            Err(err) => {
                return Err(VoiceDashError::Storage(format!(
                    "Failed to read session file {}: {err}",
                    path.display()
                )));
            }
        };

        let snapshot: PersistedSession = serde_json::from_slice(&bytes)?;
        let (credentials, profile) = snapshot.into_parts();

        let mut state = self.state.write().await;
        if state.credentials.has_token() {
            debug!("Session already populated, skipping hydration");
            return Ok(false);
        }
        if !credentials.has_token() {
            return Ok(false);
        }

        state.credentials = credentials;
        state.profile = profile;
        drop(state);

        info!(path = %path.display(), "Session hydrated from disk");
        Ok(true)
    }

    /// Record a completed login
    ///
    /// Stores the token as authenticated along with the user's profile.
    pub async fn sign_in(&self, token: String, profile: UserProfile) {
        let mut state = self.state.write().await;
        state.credentials = Credentials::authenticated(token);
        state.profile = Some(profile);
        self.persist(&state).await;
    }

    /// Profile of the signed-in user
    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.read().await.profile.clone()
    }

    async fn persist(&self, state: &SessionState) {
        let Some(path) = self.path.as_ref() else {
            return;
        };

        if !state.credentials.has_token() {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Persisted session removed"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), error = %err, "Failed to remove session file"),
            }
            return;
        }

        let snapshot = PersistedSession::capture(&state.credentials, state.profile.as_ref());
        let bytes = match serde_json::to_vec_pretty(&snapshot) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "Failed to encode session snapshot");
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                warn!(path = %parent.display(), error = %err, "Failed to create session directory");
                return;
            }
        }

        if let Err(err) = tokio::fs::write(path, bytes).await {
            warn!(path = %path.display(), error = %err, "Failed to write session file");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl CredentialStore for SessionStore {
    async fn credentials(&self) -> Credentials {
        self.state.read().await.credentials.clone()
    }

    async fn set_token(&self, token: String, authenticated: bool) {
        let mut state = self.state.write().await;
        state.credentials = Credentials { access_token: token, is_authenticated: authenticated };
        self.persist(&state).await;
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = SessionState::default();
        self.persist(&state).await;
        info!("Session credentials cleared");
    }
}
