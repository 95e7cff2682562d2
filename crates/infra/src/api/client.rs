//! Authenticated API client with single-flight token refresh
//!
//! Every request waits for a token (see [`TokenGate`]), carries it as a
//! bearer header, and is returned to the caller untouched unless the
//! backend answers 401. On 401 the first caller refreshes the token while
//! later callers queue behind it (see [`RefreshCoordinator`]); everyone then
//! replays their own request once with the new token.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use voicedash_common::{CredentialStore, SessionTerminator};
use voicedash_domain::config::{ApiConfig, AuthConfig, Config};

use super::errors::ApiError;
use super::refresh::{RefreshCoordinator, RefreshLease, RefreshRole};
use super::request::{ApiRequest, ApiResponse};
use super::token_gate::TokenGate;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// API client that manages the bearer token on behalf of its callers
pub struct AuthenticatedHttpClient {
    http: HttpClient,
    base_url: Url,
    api: ApiConfig,
    sign_in_redirect: String,
    store: Arc<dyn CredentialStore>,
    terminator: Arc<dyn SessionTerminator>,
    gate: TokenGate,
    coordinator: RefreshCoordinator,
}

impl AuthenticatedHttpClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `api` - Backend location, endpoint paths and request timeout
    /// * `auth` - Token gate timings and the sign-in redirect target
    /// * `store` - Where the access token lives
    /// * `terminator` - Called once when the session cannot be recovered
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be created
    pub fn new(
        api: ApiConfig,
        auth: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Result<Self, ApiError> {
        let mut http = HttpClient::builder().timeout(api.request_timeout());
        if let Some(agent) = api.user_agent.as_deref() {
            http = http.user_agent(agent);
        }

        Self::with_http_client(http.build()?, api, auth, store, terminator)
    }

    /// Create a client over an existing [`HttpClient`]
    ///
    /// The cookie jar is shared with every clone of `http`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid
    pub fn with_http_client(
        http: HttpClient,
        api: ApiConfig,
        auth: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&api.base_url)?;

        Ok(Self {
            http,
            base_url,
            api,
            sign_in_redirect: auth.sign_in_redirect.clone(),
            store,
            terminator,
            gate: TokenGate::from_config(auth),
            coordinator: RefreshCoordinator::new(),
        })
    }

    /// Create a client from the full application configuration
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedHttpClient::new`]
    pub fn from_config(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Result<Self, ApiError> {
        Self::new(config.api.clone(), &config.auth, store, terminator)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> AuthenticatedHttpClientBuilder {
        AuthenticatedHttpClientBuilder::default()
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedHttpClient::execute`]
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedHttpClient::execute`]
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedHttpClient::execute`]
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedHttpClient::execute`]
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Execute a caller-built request
    ///
    /// Any response other than 401 (including 4xx/5xx) is returned as
    /// `Ok`. A 401 triggers at most one shared refresh and a single replay,
    /// whose response is returned whatever its status.
    ///
    /// # Errors
    ///
    /// - `ApiError::AuthenticationUnavailable` if no token arrives in time
    /// - `ApiError::RefreshFailed` if the token could not be refreshed; the
    ///   session has been terminated
    /// - `ApiError::RefreshAbandoned` if the caller running the shared
    ///   refresh was cancelled; the session is left as it was
    /// - `ApiError::Unauthorized` if the session ended while this request
    ///   was in flight
    /// - `ApiError::Network` / `ApiError::Timeout` on transport failure
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.gate.wait_for_token(self.store.as_ref()).await?;
        let response = self.send_with_token(&request, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Backend rejected access token");
        self.recover_unauthorized(&request, &token).await
    }

    /// Clear credentials and notify the session terminator
    pub async fn terminate_session(&self) {
        self.store.clear().await;
        self.terminator.terminate(&self.sign_in_redirect);
    }

    /// Absolute URL for `path` under the configured base URL
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Client` if the joined URL is invalid
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let joined = if path.is_empty() { base.to_string() } else { format!("{base}/{path}") };

        Url::parse(&joined).map_err(|e| ApiError::Client(format!("Invalid URL {joined}: {e}")))
    }

    /// Underlying transport (shares this client's cookie jar)
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ApiConfig {
        &self.api
    }

    /// Credential store read by the token gate
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Whether a token refresh is running right now
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_in_flight()
    }

    /// Callers currently parked behind the running refresh
    pub fn pending_refresh_callers(&self) -> usize {
        self.coordinator.pending()
    }

    async fn recover_unauthorized(
        &self,
        request: &ApiRequest,
        rejected_token: &str,
    ) -> Result<ApiResponse, ApiError> {
        match self.coordinator.join() {
            RefreshRole::Follower(waiter) => {
                debug!("Waiting for in-flight token refresh");
                waiter.wait().await?;
            }
            RefreshRole::Leader(lease) => {
                self.lead_refresh(lease, rejected_token).await?;
            }
        }

        self.replay(request).await
    }

    async fn lead_refresh(
        &self,
        lease: RefreshLease<'_>,
        rejected_token: &str,
    ) -> Result<(), ApiError> {
        match self.store.token().await {
            None => {
                debug!("Session already ended, not refreshing");
                let err = ApiError::Unauthorized("session has ended".to_string());
                lease.fail(err.clone());
                return Err(err);
            }
            Some(current) if current != rejected_token => {
                debug!("Access token already replaced, skipping refresh");
                lease.succeed();
                return Ok(());
            }
            Some(_) => {}
        }

        info!("Refreshing access token");
        match self.refresh_token(rejected_token).await {
            Ok(token) => {
                self.store.set_token(token, true).await;
                let released = lease.succeed();
                info!(released, "Access token refreshed");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Token refresh failed, terminating session");
                self.terminate_session().await;
                let rejected = lease.fail(err.clone());
                warn!(rejected, "Rejected callers waiting on refresh");
                Err(err)
            }
        }
    }

    async fn refresh_token(&self, expired_token: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&self.api.refresh_path)?;
        let builder = self.http.request(Method::POST, url).bearer_auth(expired_token);

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;
        let response = ApiResponse::from_response(response)
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;

        if !response.is_success() {
            return Err(ApiError::RefreshFailed(format!(
                "refresh endpoint returned status {}",
                response.status()
            )));
        }

        let body: RefreshResponse = serde_json::from_slice(response.body())
            .map_err(|e| ApiError::RefreshFailed(format!("invalid refresh response: {e}")))?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::RefreshFailed("refresh response carried no access token".into())),
        }
    }

    async fn replay(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self
            .store
            .token()
            .await
            .ok_or_else(|| ApiError::Unauthorized("session has ended".to_string()))?;

        debug!("Replaying request with refreshed token");
        self.send_with_token(request, &token).await
    }

    async fn send_with_token(
        &self,
        request: &ApiRequest,
        token: &str,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(request.path())?;
        let mut builder = self.http.request(request.method().clone(), url);

        for (name, value) in request.headers() {
            if *name != AUTHORIZATION {
                builder = builder.header(name.clone(), value.clone());
            }
        }
        builder = builder.bearer_auth(token);

        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        let response = self.http.send(builder).await?;
        ApiResponse::from_response(response).await
    }
}

impl std::fmt::Debug for AuthenticatedHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("gate", &self.gate)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw)
        .map_err(|e| ApiError::Config(format!("Invalid API base URL {raw:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::Config(format!("Unsupported API base URL scheme: {other}"))),
    }
}

/// Builder for [`AuthenticatedHttpClient`]
#[derive(Default)]
pub struct AuthenticatedHttpClientBuilder {
    api: Option<ApiConfig>,
    auth: Option<AuthConfig>,
    http: Option<HttpClient>,
    store: Option<Arc<dyn CredentialStore>>,
    terminator: Option<Arc<dyn SessionTerminator>>,
}

impl AuthenticatedHttpClientBuilder {
    /// Backend settings (base URL, paths, timeout)
    pub fn api(mut self, api: ApiConfig) -> Self {
        self.api = Some(api);
        self
    }

    /// Shorthand for an [`ApiConfig`] with only the base URL changed
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut api = self.api.take().unwrap_or_default();
        api.base_url = base_url.into();
        self.api = Some(api);
        self
    }

    /// Token gate timings
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Reuse an existing transport instead of building one from `api`
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Store holding the access token (required)
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Receiver of the session-terminated signal (required)
    pub fn terminator(mut self, terminator: Arc<dyn SessionTerminator>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the store or terminator is missing, or
    /// if client creation fails
    pub fn build(self) -> Result<AuthenticatedHttpClient, ApiError> {
        let api = self.api.unwrap_or_default();
        let auth = self.auth.unwrap_or_default();
        let store =
            self.store.ok_or_else(|| ApiError::Config("Credential store not set".to_string()))?;
        let terminator = self
            .terminator
            .ok_or_else(|| ApiError::Config("Session terminator not set".to_string()))?;

        match self.http {
            Some(http) => {
                AuthenticatedHttpClient::with_http_client(http, api, &auth, store, terminator)
            }
            None => AuthenticatedHttpClient::new(api, &auth, store, terminator),
        }
    }
}
