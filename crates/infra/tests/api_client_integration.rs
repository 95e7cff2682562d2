//! Integration tests for the authenticated API client
//!
//! Each test runs the client against a wiremock backend and checks the
//! observable contract: one refresh per expiry episode, replays with the
//! new token, termination on refresh failure, the cold-start token gate and
//! verbatim pass-through of non-401 responses.

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use tempfile::TempDir;
use voicedash_common::testing::inject_token_after;
use voicedash_common::{CredentialStore, SessionStore};
use voicedash_infra::api::{ApiError, ApiRequest, AuthService, AuthenticatedHttpClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{auth_config, client_with, hits, mount_refresh, signed_in_client};

async fn mount_expiring_route(server: &MockServer, route: &str, old: &str, new: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {old}").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {new}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{route} ok")))
        .mount(server)
        .await;
}

async fn requests_with_token(server: &MockServer, route: &str, token: &str) -> usize {
    let expected = format!("Bearer {token}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .filter(|request| {
            request.headers.get("authorization").and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
        })
        .count()
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    let server = MockServer::start().await;
    mount_expiring_route(&server, "/calls", "tok-1", "tok-2").await;
    mount_refresh(&server, "tok-2", Duration::from_millis(200), 1).await;

    let test = signed_in_client(&server, "tok-1").await;
    let responses = join_all((0..8).map(|_| test.client.get("/calls"))).await;

    for response in responses {
        let response = response.expect("replayed response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "/calls ok");
    }

    assert_eq!(hits(&server, "/refresh").await, 1);
    assert_eq!(test.client.pending_refresh_callers(), 0);
    assert!(!test.client.is_refreshing());
    assert_eq!(test.store.token().await.as_deref(), Some("tok-2"));
    assert_eq!(test.terminator.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_refresh_holds_across_worker_threads() {
    let server = MockServer::start().await;
    mount_expiring_route(&server, "/calls", "tok-1", "tok-2").await;
    mount_refresh(&server, "tok-2", Duration::from_millis(200), 1).await;

    let test = signed_in_client(&server, "tok-1").await;
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let client = Arc::clone(&test.client);
            tokio::spawn(async move { client.get("/calls").await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.expect("task").expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(hits(&server, "/refresh").await, 1);
    assert_eq!(test.client.pending_refresh_callers(), 0);
}

#[tokio::test]
async fn every_replay_carries_the_new_token() {
    let server = MockServer::start().await;
    mount_expiring_route(&server, "/calls", "tok-1", "tok-2").await;
    mount_refresh(&server, "tok-2", Duration::from_millis(150), 1).await;

    let test = signed_in_client(&server, "tok-1").await;
    let responses = join_all((0..5).map(|_| test.client.get("/calls"))).await;
    assert!(responses.iter().all(Result::is_ok));

    assert_eq!(requests_with_token(&server, "/calls", "tok-1").await, 5);
    assert_eq!(requests_with_token(&server, "/calls", "tok-2").await, 5);
}

#[tokio::test]
async fn refresh_sends_expired_token() {
    let server = MockServer::start().await;
    mount_expiring_route(&server, "/calls", "tok-1", "tok-2").await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let test = signed_in_client(&server, "tok-1").await;
    let response = test.client.get("/calls").await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn replay_preserves_method_headers_and_body() {
    let server = MockServer::start().await;
    let payload = serde_json::json!({"name": "Front desk", "voice": "alloy"});
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(header("authorization", "Bearer tok-2"))
        .and(header("x-request-source", "dashboard"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "tok-2", Duration::ZERO, 1).await;

    let test = signed_in_client(&server, "tok-1").await;
    let request = ApiRequest::post("/assistants")
        .json(&payload)
        .expect("json body")
        .header(HeaderName::from_static("x-request-source"), HeaderValue::from_static("dashboard"));

    let response = test.client.execute(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn refresh_failure_terminates_once_and_fails_everyone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calls"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let test = signed_in_client(&server, "tok-1").await;
    let results = join_all((0..5).map(|_| test.client.get("/calls"))).await;

    assert_eq!(results.len(), 5);
    for result in &results {
        let err = result.as_ref().expect_err("caller must fail");
        assert!(err.is_unauthorized(), "unexpected error: {err}");
    }
    assert!(results.iter().any(|r| matches!(r, Err(ApiError::RefreshFailed(_)))));

    assert_eq!(test.terminator.calls(), 1);
    assert_eq!(test.terminator.redirects(), vec!["/sign-in".to_string()]);
    assert!(test.store.token().await.is_none());
    assert!(!test.store.credentials().await.is_authenticated);
    assert_eq!(test.client.pending_refresh_callers(), 0);
    assert_eq!(hits(&server, "/refresh").await, 1);
}

#[tokio::test]
async fn late_401_after_termination_does_not_refresh_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let test = signed_in_client(&server, "tok-1").await;
    let (fast, slow) = tokio::join!(test.client.get("/fast"), test.client.get("/slow"));

    assert!(matches!(fast, Err(ApiError::RefreshFailed(_))));
    assert!(matches!(slow, Err(ApiError::Unauthorized(_))));
    assert_eq!(test.terminator.calls(), 1);
}

#[tokio::test]
async fn stale_401_replays_without_second_refresh() {
    let server = MockServer::start().await;
    mount_expiring_route(&server, "/fast", "tok-1", "tok-2").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_refresh(&server, "tok-2", Duration::from_millis(50), 1).await;

    let test = signed_in_client(&server, "tok-1").await;
    let (fast, slow) = tokio::join!(test.client.get("/fast"), test.client.get("/slow"));

    assert_eq!(fast.expect("fast").status(), StatusCode::OK);
    assert_eq!(slow.expect("slow").status(), StatusCode::OK);
    assert_eq!(hits(&server, "/refresh").await, 1);
}

#[tokio::test]
async fn cold_start_waits_for_late_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calls"))
        .and(header("authorization", "Bearer late"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let test = client_with(&server, &auth_config(5_000, 100));
    inject_token_after(test.store.clone(), "late", Duration::from_millis(300));

    let started = Instant::now();
    let response = test.client.get("/calls").await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(started.elapsed() < Duration::from_millis(1_500));
}

#[tokio::test]
async fn missing_token_times_out_as_401() {
    let server = MockServer::start().await;
    let test = client_with(&server, &auth_config(500, 100));

    let started = Instant::now();
    let err = test.client.get("/calls").await.expect_err("no token");
    let elapsed = started.elapsed();

    assert!(matches!(err, ApiError::AuthenticationUnavailable { .. }));
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(elapsed >= Duration::from_millis(500), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "returned late: {elapsed:?}");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    assert_eq!(test.terminator.calls(), 0);
}

#[tokio::test]
async fn non_401_responses_pass_through_verbatim() {
    let server = MockServer::start().await;
    for (route, status, body) in
        [("/ok", 200u16, "fine"), ("/missing", 404, "no such call"), ("/broken", 500, "boom")]
    {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    mount_refresh(&server, "unused", Duration::ZERO, 0).await;

    let test = signed_in_client(&server, "tok-1").await;

    for (route, status, body) in
        [("/ok", 200u16, "fine"), ("/missing", 404, "no such call"), ("/broken", 500, "boom")]
    {
        let response = test.client.get(route).await.expect("response");
        assert_eq!(response.status().as_u16(), status);
        assert_eq!(response.text(), body);
    }

    assert_eq!(hits(&server, "/refresh").await, 0);
    assert_eq!(test.store.token().await.as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn login_persists_session_and_hydration_unblocks_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-login",
            "name": "Ada",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calls"))
        .and(header("authorization", "Bearer tok-login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let session_file = dir.path().join("session.json");

    // First process: sign in and persist.
    {
        let store = Arc::new(SessionStore::persistent(&session_file));
        let client = AuthenticatedHttpClient::builder()
            .base_url(server.uri())
            .store(store.clone())
            .terminator(Arc::new(voicedash_common::testing::RecordingSessionTerminator::new()))
            .build()
            .expect("client");
        let auth = AuthService::new(Arc::new(client), store);

        let profile = auth.login("ada@example.com", "hunter2").await.expect("login");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
    }

    let raw = std::fs::read_to_string(&session_file).expect("session file");
    assert!(raw.contains("tok-login"));
    assert!(!raw.contains("hunter2"));

    // Second process: a request issued before hydration waits for it.
    let store = Arc::new(SessionStore::persistent(&session_file));
    let client = Arc::new(
        AuthenticatedHttpClient::builder()
            .base_url(server.uri())
            .store(store.clone())
            .terminator(Arc::new(voicedash_common::testing::RecordingSessionTerminator::new()))
            .build()
            .expect("client"),
    );
    let auth = AuthService::new(Arc::clone(&client), store);

    let pending = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.get("/calls").await }
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(auth.hydrate().await);

    let response = pending.await.expect("task").expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(auth.is_authenticated().await);
    assert_eq!(auth.profile().await.and_then(|p| p.email).as_deref(), Some("ada@example.com"));
}
