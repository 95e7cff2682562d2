//! Traits for credential storage and session termination
//!
//! These traits decouple the API client from where credentials live and from
//! how the host application reacts to a forced sign-out.

use async_trait::async_trait;
use voicedash_domain::Credentials;

/// Trait for credential storage
///
/// Implementations must be safe to read and write from any task, including
/// callers suspended while a token refresh is in flight.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Snapshot of the current credentials
    async fn credentials(&self) -> Credentials;

    /// Current access token, `None` when no token is held
    async fn token(&self) -> Option<String> {
        let credentials = self.credentials().await;
        credentials.token().map(ToOwned::to_owned)
    }

    /// Replace the access token
    ///
    /// # Arguments
    /// * `token` - New access token
    /// * `authenticated` - Whether the session should be marked authenticated
    async fn set_token(&self, token: String, authenticated: bool);

    /// Drop all credentials (token emptied, authenticated flag cleared)
    async fn clear(&self);
}

/// Trait for the sign-out collaborator
///
/// Called once a session can no longer be recovered. The call is
/// fire-and-forget: implementations must not block.
pub trait SessionTerminator: Send + Sync {
    /// Sign the user out and send them to `redirect_to`
    fn terminate(&self, redirect_to: &str);
}
