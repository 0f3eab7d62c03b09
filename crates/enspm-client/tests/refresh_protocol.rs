//! Integration tests for bearer injection and the refresh-and-retry protocol.
//!
//! Each test runs a wiremock server standing in for the API and drives the
//! client through `EnspmClient::send`.

use std::sync::Arc;
use std::time::Duration;

use enspm_client::{
    ApiRequest, EnspmClient, Error, FileSessionStore, InMemorySessionStore, Session, SessionStore,
    SharedSessionStore,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Matches requests that carry no `Authorization` header at all.
struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn client_for(server: &MockServer, store: SharedSessionStore) -> EnspmClient {
    EnspmClient::builder()
        .base_url(server.uri())
        .session_store(store)
        .build()
        .unwrap()
}

async fn setup(session: Session) -> (MockServer, EnspmClient, Arc<InMemorySessionStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(InMemorySessionStore::with_session(session));
    let client = client_for(&server, store.clone());
    (server, client, store)
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" }))
}

fn ok_users() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "users": [] }))
}

fn refreshed(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer"
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bearer injection
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_attached_when_token_present() {
    let (server, client, _store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ok_users())
        .expect(1)
        .mount(&server)
        .await;

    let response = client.send(&ApiRequest::get("users")).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (server, client, _store) = setup(Session::signed_out()).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(NoAuthorization)
        .respond_with(ok_users())
        .expect(1)
        .mount(&server)
        .await;

    client.send(&ApiRequest::get("users")).await.unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Refresh and retry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried_once() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .and(NoAuthorization)
        .respond_with(refreshed("A2", "R2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ok_users())
        .expect(1)
        .mount(&server)
        .await;

    let response = client.send(&ApiRequest::get("users")).await.unwrap();
    assert_eq!(response.status(), 200);

    let session = store.load().await.unwrap();
    assert_eq!(session.access_token(), Some("A2"));
    assert_eq!(session.refresh_token(), Some("R2"));
}

#[tokio::test]
async fn test_refresh_without_rotation_keeps_refresh_token() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "A2" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ok_users())
        .expect(1)
        .mount(&server)
        .await;

    client.send(&ApiRequest::get("users")).await.unwrap();

    let session = store.load().await.unwrap();
    assert_eq!(session.access_token(), Some("A2"));
    assert_eq!(session.refresh_token(), Some("R1"));
}

#[tokio::test]
async fn test_refresh_failure_clears_session_and_returns_original_401() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Bad refresh token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.send(&ApiRequest::get("users")).await.unwrap_err();
    match err {
        Error::Auth { message } => assert_eq!(message, "Token expired"),
        other => panic!("expected the original 401, got {other:?}"),
    }

    let session = store.load().await.unwrap();
    assert!(session.access_token().is_none());
    assert!(session.refresh_token().is_none());
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_no_refresh_without_refresh_token() {
    let (server, client, store) = setup(Session::signed_out()).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2"))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.send(&ApiRequest::get("users")).await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_401_on_retry_is_not_refreshed_again() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.send(&ApiRequest::get("users")).await.unwrap_err();
    assert!(err.is_auth_error());

    // The refresh itself succeeded, so the new tokens stay.
    let session = store.load().await.unwrap();
    assert_eq!(session.access_token(), Some("A2"));
    assert_eq!(session.refresh_token(), Some("R2"));
}

#[tokio::test]
async fn test_other_failures_do_not_refresh() {
    let (server, client, _store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/statistics"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "detail": "Admins only" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organisations/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2"))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .send(&ApiRequest::get("users/statistics"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(ref m) if m == "Admins only"));

    let err = client
        .send(&ApiRequest::get("organisations/"))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_transport_error_is_not_refreshed() {
    let store = Arc::new(InMemorySessionStore::with_session(Session::with_tokens(
        "A1", "R1",
    )));
    // Nothing listens on port 9 of the loopback.
    let client = EnspmClient::builder()
        .base_url("http://127.0.0.1:9")
        .session_store(store.clone())
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = client.send(&ApiRequest::get("users")).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_request_body_is_resent_on_retry() {
    let (server, client, _store) = setup(Session::with_tokens("A1", "R1")).await;
    let body = json!({ "statut": "active" });

    Mock::given(method("PATCH"))
        .and(path("/api/v1/organisations/o1/status"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2"))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/organisations/o1/status"))
        .and(header("authorization", "Bearer A2"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::patch("organisations/o1/status")
        .with_json(&body)
        .unwrap();
    client.send(&request).await.unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Explicit refresh
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sequential_refreshes_keep_latest_tokens() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(refreshed("A2", "R2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "R2" })))
        .respond_with(refreshed("A3", "R3"))
        .expect(1)
        .mount(&server)
        .await;

    client.refresh_session().await.unwrap();
    let session = client.refresh_session().await.unwrap();

    assert_eq!(session.access_token(), Some("A3"));
    assert_eq!(session.refresh_token(), Some("R3"));
    assert_eq!(store.load().await.unwrap(), session);
}

#[tokio::test]
async fn test_explicit_refresh_without_session_fails() {
    let (_server, client, _store) = setup(Session::signed_out()).await;
    let err = client.refresh_session().await.unwrap_err();
    assert!(err.is_auth_error());
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrent 401s
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let (server, client, store) = setup(Session::with_tokens("A1", "R1")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2").set_delay(Duration::from_millis(50)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ok_users())
        .expect(2)
        .mount(&server)
        .await;

    let request = ApiRequest::get("users");
    let (first, second) = tokio::join!(client.send(&request), client.send(&request));
    first.unwrap();
    second.unwrap();

    assert_eq!(store.load().await.unwrap().access_token(), Some("A2"));
}

#[tokio::test]
async fn test_independent_refresh_mode_refreshes_per_request() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemorySessionStore::with_session(Session::with_tokens(
        "A1", "R1",
    )));
    let client = EnspmClient::builder()
        .base_url(server.uri())
        .session_store(store.clone())
        .single_flight_refresh(false)
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refreshed("A2", "R2"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ok_users())
        .expect(2)
        .mount(&server)
        .await;

    let request = ApiRequest::get("users");
    let (first, second) = tokio::join!(client.send(&request), client.send(&request));
    first.unwrap();
    second.unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_failure_clears_persisted_session() {
    let temp = tempfile::tempdir().unwrap();
    let file_store = Arc::new(FileSessionStore::new(temp.path()));
    file_store
        .set_tokens("A1".to_string(), "R1".to_string())
        .await
        .unwrap();

    let server = MockServer::start().await;
    let client = client_for(&server, file_store.clone());

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.auth().me().await.unwrap_err();
    assert!(err.is_auth_error());

    let reopened = FileSessionStore::new(temp.path());
    let session = reopened.load().await.unwrap();
    assert_eq!(session, Session::signed_out());
}
