//! Login, logout and session hydration
//!
//! Sits next to [`AuthenticatedHttpClient`] and shares its transport, so
//! the refresh cookie handed out by the login response is the one sent by
//! later refresh calls.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use voicedash_common::{CredentialStore, SessionStore};
use voicedash_domain::UserProfile;

use super::client::AuthenticatedHttpClient;
use super::errors::ApiError;
use super::request::ApiResponse;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Session lifecycle operations
pub struct AuthService {
    client: Arc<AuthenticatedHttpClient>,
    store: Arc<SessionStore>,
}

impl AuthService {
    /// `store` must be the same store `client` reads its token from.
    pub fn new(client: Arc<AuthenticatedHttpClient>, store: Arc<SessionStore>) -> Self {
        Self { client, store }
    }

    /// Exchange email and password for an access token
    ///
    /// The password is sent once and never stored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` if the backend rejects the credentials or
    /// answers without a token, and transport errors as-is
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let url = self.client.endpoint(&self.client.config().login_path)?;
        let http = self.client.http();
        let builder = http.request(Method::POST, url).json(&LoginRequest { email, password });

        let response = ApiResponse::from_response(http.send(builder).await?).await?;
        if !response.is_success() {
            warn!(status = %response.status(), "Login rejected");
            return Err(ApiError::Auth(format!("login failed with status {}", response.status())));
        }

        let body: LoginResponse = response
            .json()
            .map_err(|e| ApiError::Auth(format!("invalid login response: {e}")))?;
        let token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Auth("login response carried no access token".to_string()))?;

        let profile =
            UserProfile { name: body.name, email: body.email.or_else(|| Some(email.to_string())) };
        self.store.sign_in(token, profile.clone()).await;

        info!("Signed in");
        Ok(profile)
    }

    /// End the session and notify the session terminator
    pub async fn logout(&self) {
        self.client.terminate_session().await;
        info!("Signed out");
    }

    /// Load the persisted session, if any
    ///
    /// Returns `true` when a session was restored. A snapshot that cannot be
    /// read is logged and ignored so the user simply signs in again.
    pub async fn hydrate(&self) -> bool {
        match self.store.hydrate().await {
            Ok(restored) => restored,
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable persisted session");
                false
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.credentials().await.is_authenticated
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.store.profile().await
    }
}
