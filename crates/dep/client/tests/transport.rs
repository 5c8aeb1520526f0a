//! Transport behavior against a local DEP stand-in: session caching,
//! single-flight refresh, 401 retry, and error classification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use dep_client::{DepClient, DepError};
use dep_core::{DepConfig, DeviceRequest, OAuth1Tokens};
use dep_storage::{AuthTokenStore as _, ConfigStore as _, InMemStorage};

#[derive(Default)]
struct Sim {
    /// Count of `/session` requests served.
    sessions: AtomicUsize,
    /// API responses to reject with 401 before behaving, regardless of
    /// the presented session token.
    reject_unauthorized: AtomicUsize,
    /// Delay applied to `/session`, to hold concurrent callers in flight.
    session_delay_ms: u64,
}

async fn session_handler(State(sim): State<Arc<Sim>>) -> Json<serde_json::Value> {
    if sim.session_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(sim.session_delay_ms)).await;
    }
    let n = sim.sessions.fetch_add(1, Ordering::SeqCst) + 1;
    Json(serde_json::json!({ "auth_session_token": format!("tok-{n}") }))
}

fn take_rejection(sim: &Sim) -> bool {
    sim.reject_unauthorized
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

async fn account_handler(State(sim): State<Arc<Sim>>, headers: HeaderMap) -> Response {
    if !headers.contains_key("X-ADM-Auth-Session") {
        return (StatusCode::UNAUTHORIZED, "\"no session\"").into_response();
    }
    if take_rejection(&sim) {
        return (StatusCode::UNAUTHORIZED, "\"unauthorized\"").into_response();
    }
    Json(serde_json::json!({ "server_uuid": "677cab70-fe18" })).into_response()
}

async fn sync_handler(State(sim): State<Arc<Sim>>) -> Response {
    if take_rejection(&sim) {
        return (StatusCode::UNAUTHORIZED, "\"unauthorized\"").into_response();
    }
    // the depsim simulator returns the error string with quotes
    (StatusCode::BAD_REQUEST, "\"EXPIRED_CURSOR\"").into_response()
}

async fn beta_handler() -> Response {
    (StatusCode::FORBIDDEN, "\"APPLE_SEED_FOR_IT_TURNED_OFF\"").into_response()
}

/// Serve the stand-in and return a client whose stored config points at
/// it.
async fn start(sim: Arc<Sim>) -> (DepClient<Arc<InMemStorage>>, Arc<InMemStorage>) {
    let app = Router::new()
        .route("/session", get(session_handler))
        .route("/account", get(account_handler))
        .route("/devices/sync", post(sync_handler))
        .route("/os-beta-enrollment/tokens", get(beta_handler))
        .with_state(sim);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = Arc::new(InMemStorage::new());
    store
        .store_auth_tokens(
            "acme",
            &OAuth1Tokens {
                consumer_key: "CK_123".into(),
                consumer_secret: "CS_456".into(),
                access_token: "AT_789".into(),
                access_secret: "AS_012".into(),
                access_token_expiry: "2030-01-01T00:00:00Z".parse().unwrap(),
            },
        )
        .unwrap();
    store
        .store_config("acme", &DepConfig { base_url: format!("http://{addr}") })
        .unwrap();

    (DepClient::new(store.clone()), store)
}

#[tokio::test]
async fn session_is_cached_across_calls() {
    let sim = Arc::new(Sim::default());
    let (client, _) = start(sim.clone()).await;

    let detail = client.account_detail("acme").await.unwrap();
    assert_eq!(detail.server_uuid.as_deref(), Some("677cab70-fe18"));

    client.account_detail("acme").await.unwrap();
    client.account_detail("acme").await.unwrap();

    assert_eq!(sim.sessions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_flight_refresh_under_concurrency() {
    let sim = Arc::new(Sim { session_delay_ms: 100, ..Default::default() });
    let (client, _) = start(sim.clone()).await;

    let calls = (0..8).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.account_detail("acme").await })
    });
    for result in futures::future::join_all(calls).await {
        result.unwrap().unwrap();
    }

    assert_eq!(sim.sessions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retries_once_after_401() {
    let sim = Arc::new(Sim::default());
    sim.reject_unauthorized.store(1, Ordering::SeqCst);
    let (client, _) = start(sim.clone()).await;

    // the 401 is absorbed: the caller sees the eventual 200
    let detail = client.account_detail("acme").await.unwrap();
    assert_eq!(detail.server_uuid.as_deref(), Some("677cab70-fe18"));

    // the retry re-authenticated
    assert_eq!(sim.sessions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn second_401_surfaces_auth_error() {
    let sim = Arc::new(Sim::default());
    sim.reject_unauthorized.store(usize::MAX, Ordering::SeqCst);
    let (client, _) = start(sim.clone()).await;

    let err = client.account_detail("acme").await.unwrap_err();
    assert!(matches!(err, DepError::Auth { status: 401, .. }), "got {err:?}");

    // one initial session plus exactly one refresh
    assert_eq!(sim.sessions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn classifies_cursor_and_beta_errors() {
    let sim = Arc::new(Sim::default());
    let (client, _) = start(sim.clone()).await;

    let err = client
        .sync_devices("acme", &DeviceRequest { cursor: Some("stale".into()), limit: None })
        .await
        .unwrap_err();
    assert!(err.is_cursor_expired(), "got {err:?}");
    assert!(!err.is_cursor_invalid());

    let err = client.os_beta_enrollment_tokens("acme").await.unwrap_err();
    assert!(err.is_apple_seed_for_it_turned_off(), "got {err:?}");
}

#[tokio::test]
async fn missing_tokens_surface_not_found() {
    let sim = Arc::new(Sim::default());
    let (client, _) = start(sim).await;

    let err = client.account_detail("never-configured").await.unwrap_err();
    assert!(
        matches!(err, DepError::Storage(dep_storage::StorageError::NotFound)),
        "got {err:?}"
    );
}
