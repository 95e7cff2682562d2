//! Cold-start token gate
//!
//! Requests issued before a session exists wait here until the store holds
//! a token or the deadline passes.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use voicedash_common::CredentialStore;
use voicedash_domain::config::AuthConfig;

use super::errors::ApiError;

/// Polls a [`CredentialStore`] until a token shows up
#[derive(Debug, Clone, Copy)]
pub struct TokenGate {
    poll_interval: Duration,
    timeout: Duration,
}

impl TokenGate {
    /// Create a gate; a zero poll interval is bumped to one millisecond
    #[must_use]
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self { poll_interval: poll_interval.max(Duration::from_millis(1)), timeout }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_poll_interval(), config.token_wait_timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return the current token, waiting up to the configured timeout
    ///
    /// A token already present is returned without sleeping.
    ///
    /// # Errors
    /// Returns `ApiError::AuthenticationUnavailable` when the deadline
    /// passes with the store still empty
    pub async fn wait_for_token(&self, store: &dyn CredentialStore) -> Result<String, ApiError> {
        if let Some(token) = store.token().await {
            return Ok(token);
        }

        let started = Instant::now();
        let deadline = started + self.timeout;
        debug!(timeout_ms = self.timeout.as_millis() as u64, "Waiting for access token");

        loop {
            let now = Instant::now();
            if now >= deadline {
                let waited = now.duration_since(started);
                warn!(waited_ms = waited.as_millis() as u64, "No access token became available");
                return Err(ApiError::AuthenticationUnavailable { waited });
            }

            sleep(self.poll_interval.min(deadline - now)).await;

            if let Some(token) = store.token().await {
                debug!(
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Access token became available"
                );
                return Ok(token);
            }
        }
    }
}

impl Default for TokenGate {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}
