use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use guessthebeat::{
    error::ApiError,
    session::{SessionRefreshRequester, SessionSource},
    spotify::client::{MAX_RETRIES, ResilientClient, RetryPolicy},
    types::{Session, TokenError},
};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_DELAY: Duration = Duration::from_millis(10);
/// Long enough that one extra backoff step stands out from request latency.
const TIMED_DELAY: Duration = Duration::from_millis(50);

/// Session owner stand-in: every refresh request swaps in the next queued token.
struct FakeSession {
    session: Mutex<Session>,
    queued: Mutex<VecDeque<Session>>,
    refreshes: AtomicU32,
}

impl FakeSession {
    fn new(token: &str) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Session {
                access_token: Some(token.to_string()),
                error: None,
            }),
            queued: Mutex::new(VecDeque::new()),
            refreshes: AtomicU32::new(0),
        })
    }

    fn then(self: Arc<Self>, token: &str) -> Arc<Self> {
        self.then_session(Session {
            access_token: Some(token.to_string()),
            error: None,
        })
    }

    fn then_session(self: Arc<Self>, session: Session) -> Arc<Self> {
        self.queued.lock().unwrap().push_back(session);
        self
    }

    fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRefreshRequester for FakeSession {
    async fn request_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            *self.session.lock().unwrap() = next;
        }
    }
}

#[async_trait]
impl SessionSource for FakeSession {
    async fn current_session(&self) -> Session {
        self.session.lock().unwrap().clone()
    }
}

fn client(server: &MockServer, session: &Arc<FakeSession>) -> ResilientClient {
    client_with_delay(server, session, BASE_DELAY)
}

fn client_with_delay(
    server: &MockServer,
    session: &Arc<FakeSession>,
    base_delay: Duration,
) -> ResilientClient {
    ResilientClient::new(&server.uri(), session.clone(), session.clone()).with_policy(
        RetryPolicy {
            max_retries: MAX_RETRIES,
            base_delay,
        },
    )
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn refreshed_token_is_used_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "player" })))
        .mount(&server)
        .await;

    let session = FakeSession::new("old").then("new");
    let client = client(&server, &session);

    let body: Value = client
        .request(&client.url("me"), "old")
        .await
        .expect("request succeeds after refresh");

    assert_eq!(body, json!({ "id": "player" }));
    assert_eq!(session.refreshes(), 1);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn repeated_unauthorized_stops_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = FakeSession::new("t0")
        .then("t1")
        .then("t2")
        .then("t3")
        .then("t4");
    let client = client(&server, &session);

    let err = client
        .request::<Value>(&client.url("me"), "t0")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired { attempts: 4 }));
    assert!(err.requires_login());
    assert_eq!(session.refreshes(), MAX_RETRIES);
    assert_eq!(request_count(&server).await, 1 + MAX_RETRIES as usize);
}

#[tokio::test]
async fn unchanged_token_falls_back_to_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // refresh never produces a different token
    let session = FakeSession::new("same");
    let client = client_with_delay(&server, &session, TIMED_DELAY);

    let start = Instant::now();
    let err = client
        .request::<Value>(&client.url("me"), "same")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired { attempts: 4 }));
    assert_eq!(session.refreshes(), MAX_RETRIES);
    assert_eq!(request_count(&server).await, 4);
    // 1 + 2 + 3 steps between four attempts, nothing after the last one
    let elapsed = start.elapsed();
    assert!(elapsed >= TIMED_DELAY * 6);
    assert!(elapsed < TIMED_DELAY * 9, "waited {:?}", elapsed);
}

#[tokio::test]
async fn server_errors_retry_with_linear_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let session = FakeSession::new("token");
    let client = client_with_delay(&server, &session, TIMED_DELAY);

    let start = Instant::now();
    let err = client
        .request::<Value>(&client.url("me/playlists"), "token")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transient { attempts: 4, .. }));
    assert!(err.is_retryable());
    assert_eq!(session.refreshes(), 0);
    let elapsed = start.elapsed();
    assert!(elapsed >= TIMED_DELAY * (1 + 2 + 3));
    assert!(elapsed < TIMED_DELAY * 9, "waited {:?}", elapsed);
}

#[tokio::test]
async fn transient_failure_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "player" })))
        .mount(&server)
        .await;

    let session = FakeSession::new("token");
    let client = client(&server, &session);

    let body: Value = client.get("me").await.expect("third attempt succeeds");
    assert_eq!(body["id"], "player");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn network_failures_become_transient_error() {
    // nothing listens on the discard port
    let session = FakeSession::new("token");
    let client = ResilientClient::new("http://127.0.0.1:9", session.clone(), session.clone())
        .with_policy(RetryPolicy {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        });

    let start = Instant::now();
    let err = client.get::<Value>("me").await.unwrap_err();

    assert!(matches!(err, ApiError::Transient { attempts: 4, .. }));
    assert_eq!(session.refreshes(), 0);
    assert!(start.elapsed() >= BASE_DELAY * 6);
}

#[tokio::test]
async fn empty_token_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = FakeSession::new("");
    let client = client(&server, &session);

    let err = client
        .request::<Value>(&client.url("me"), "")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::CredentialMissing));

    let err = client.get::<Value>("me").await.unwrap_err();
    assert!(matches!(err, ApiError::CredentialMissing));
    assert_eq!(session.refreshes(), 0);
}

#[tokio::test]
async fn retry_after_refresh_matches_direct_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "p1", "name": "Road trip", "images": [], "tracks": { "total": 12 } }],
            "next": null
        })))
        .mount(&server)
        .await;

    let recovering = FakeSession::new("stale").then("fresh");
    let after_refresh: Value = client(&server, &recovering)
        .get("me/playlists")
        .await
        .expect("recovered");
    let again: Value = client(&server, &recovering)
        .get("me/playlists")
        .await
        .expect("repeat");

    let valid = FakeSession::new("fresh");
    let direct: Value = client(&server, &valid)
        .get("me/playlists")
        .await
        .expect("direct");

    assert_eq!(after_refresh, direct);
    assert_eq!(again, direct);
}

#[tokio::test]
async fn dead_session_after_refresh_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = FakeSession::new("old").then_session(Session {
        access_token: Some("old".to_string()),
        error: Some(TokenError::RefreshFailed),
    });
    let client = client(&server, &session);

    let err = client.get::<Value>("me").await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed));
}

#[tokio::test]
async fn undecodable_success_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let session = FakeSession::new("token");
    let err = client(&server, &session)
        .get::<Value>("me")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn provider_error_message_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists/missing/tracks"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "status": 404, "message": "Resource not found" }
        })))
        .mount(&server)
        .await;

    let session = FakeSession::new("token");
    let client = ResilientClient::new(&server.uri(), session.clone(), session.clone())
        .with_policy(RetryPolicy {
            max_retries: 0,
            base_delay: BASE_DELAY,
        });

    match client.get::<Value>("playlists/missing/tracks").await {
        Err(ApiError::Transient { attempts, message }) => {
            assert_eq!(attempts, 1);
            assert!(message.contains("Resource not found"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn url_resolution() {
    let session = FakeSession::new("token");
    let client = ResilientClient::new(
        "https://api.spotify.com/v1/",
        session.clone(),
        session.clone(),
    );

    assert_eq!(client.url("me"), "https://api.spotify.com/v1/me");
    assert_eq!(client.url("/me/playlists"), "https://api.spotify.com/v1/me/playlists");
    assert_eq!(
        client.url("https://api.spotify.com/v1/me/playlists?offset=50"),
        "https://api.spotify.com/v1/me/playlists?offset=50"
    );
}
