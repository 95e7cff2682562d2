#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use voicedash_common::testing::RecordingSessionTerminator;
use voicedash_common::{CredentialStore, SessionStore};
use voicedash_domain::config::{ApiConfig, AuthConfig};
use voicedash_infra::api::AuthenticatedHttpClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client wired to a mock backend, plus handles on its collaborators.
pub struct TestClient {
    pub client: Arc<AuthenticatedHttpClient>,
    pub store: Arc<SessionStore>,
    pub terminator: RecordingSessionTerminator,
}

pub fn auth_config(wait_ms: u64, poll_ms: u64) -> AuthConfig {
    AuthConfig {
        token_wait_timeout_ms: wait_ms,
        token_poll_interval_ms: poll_ms,
        ..AuthConfig::default()
    }
}

/// Build a client against `server` with the given gate timings.
pub fn client_with(server: &MockServer, auth: &AuthConfig) -> TestClient {
    let store = Arc::new(SessionStore::in_memory());
    let terminator = RecordingSessionTerminator::new();
    let api = ApiConfig {
        base_url: server.uri(),
        request_timeout_ms: 2_000,
        ..ApiConfig::default()
    };

    let client = AuthenticatedHttpClient::new(
        api,
        auth,
        store.clone(),
        Arc::new(terminator.clone()),
    )
    .expect("client should build");

    TestClient { client: Arc::new(client), store, terminator }
}

/// Client holding `token`, with the default gate timings.
pub async fn signed_in_client(server: &MockServer, token: &str) -> TestClient {
    let test = client_with(server, &AuthConfig::default());
    test.store.set_token(token.to_string(), true).await;
    test
}

/// Mount a refresh endpoint that hands out `token` after `delay`.
pub async fn mount_refresh(server: &MockServer, token: &str, delay: Duration, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": token }))
                .set_delay(delay),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Number of requests the server saw on `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}
