//! HTTP client tests against an in-process axum server.
//!
//! The client is blocking, so the server runs on its own runtime thread and
//! the tests call the client from the plain test thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::get, Json, Router};
use serde_json::json;

use ed_api_types::{RoomType, ORIGIN_PATH, TOP_CHANNELS_PATH};
use ed_core::config::Credentials;
use ed_core::generation::FetchTracker;
use ed_core::period::PeriodSelection;

#[path = "../src/api_client.rs"]
mod api_client;

use api_client::{ApiClient, ApiError};

#[derive(Debug, Clone)]
struct Seen {
    path: &'static str,
    query: HashMap<String, String>,
    user_id: Option<String>,
    auth_token: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, path: &'static str, query: HashMap<String, String>, headers: &HeaderMap) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    log.lock().unwrap().push(Seen {
        path,
        query,
        user_id: header("x-user-id"),
        auth_token: header("x-auth-token"),
    });
}

fn recording_router(log: Log) -> Router {
    Router::new()
        .route(
            ORIGIN_PATH,
            get(
                |State(log): State<Log>,
                 Query(q): Query<HashMap<String, String>>,
                 headers: HeaderMap| async move {
                    record(&log, ORIGIN_PATH, q, &headers);
                    Json(json!({
                        "origins": [
                            {"t": "d", "messages": 12},
                            {"t": "c", "messages": 8},
                            {"t": "p", "messages": 20}
                        ]
                    }))
                },
            ),
        )
        .route(
            TOP_CHANNELS_PATH,
            get(
                |State(log): State<Log>,
                 Query(q): Query<HashMap<String, String>>,
                 headers: HeaderMap| async move {
                    record(&log, TOP_CHANNELS_PATH, q, &headers);
                    Json(json!({
                        "channels": [
                            {"t": "p", "messages": 15, "name": "general"},
                            {"t": "d", "messages": 9, "usernames": ["alice", "bob"]}
                        ]
                    }))
                },
            ),
        )
        .with_state(log)
}

/// Serve `app` on an ephemeral port from a dedicated runtime thread.
fn spawn_server(app: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

#[test]
fn fetch_origins_sends_period_bounds() {
    let log: Log = Arc::default();
    let base = spawn_server(recording_router(log.clone()));
    let client = ApiClient::new(&base);

    let range = PeriodSelection::Last30.resolve();
    let origins = client.fetch_origins(&range.params()).unwrap();
    assert_eq!(origins.origins.len(), 3);
    assert_eq!(origins.origins[2].room_type, RoomType::Public);
    assert_eq!(origins.origins[2].messages, 20);

    let seen = log.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, ORIGIN_PATH);
    assert_eq!(seen[0].query["start"], range.params().start_iso());
    assert_eq!(seen[0].query["end"], range.params().end_iso());
    assert!(seen[0].query["end"].ends_with(".999Z"));
    assert!(seen[0].user_id.is_none());
}

#[test]
fn credentials_are_sent_as_headers() {
    let log: Log = Arc::default();
    let base = spawn_server(recording_router(log.clone()));
    let client = ApiClient::with_options(
        &base,
        Duration::from_secs(5),
        Some(Credentials {
            user_id: "u-123".into(),
            auth_token: "secret-token".into(),
        }),
    );

    client
        .fetch_top_channels(&PeriodSelection::Last7.resolve().params())
        .unwrap();

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].user_id.as_deref(), Some("u-123"));
    assert_eq!(seen[0].auth_token.as_deref(), Some("secret-token"));
}

#[test]
fn fetch_section_returns_both_payloads_for_ticket() {
    let log: Log = Arc::default();
    let base = spawn_server(recording_router(log.clone()));
    let client = ApiClient::new(&format!("{base}/"));

    let mut tracker = FetchTracker::new(PeriodSelection::Last7);
    tracker.select(PeriodSelection::Last90);
    let ticket = tracker.ticket();

    let fetch = client.fetch_section(ticket);
    assert_eq!(fetch.ticket, ticket);
    assert_eq!(fetch.origins.as_ref().unwrap().origins.len(), 3);
    let channels = fetch.channels.as_ref().unwrap();
    assert_eq!(channels.channels[0].name.as_deref(), Some("general"));
    assert_eq!(channels.channels[1].usernames, vec!["alice", "bob"]);

    // Both endpoints were called with the same bounds.
    let seen = log.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].query, seen[1].query);
    assert_eq!(seen[0].query["start"], fetch.range.params().start_iso());
}

#[test]
fn http_error_status_is_reported() {
    let app = Router::new().route(
        ORIGIN_PATH,
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
    );
    let base = spawn_server(app);
    let client = ApiClient::new(&base);

    let err = client
        .fetch_origins(&PeriodSelection::Last7.resolve().params())
        .unwrap_err();
    match err {
        ApiError::Status { path, status } => {
            assert_eq!(path, ORIGIN_PATH);
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn malformed_payload_is_a_decode_error() {
    let app = Router::new().route(
        TOP_CHANNELS_PATH,
        get(|| async { Json(json!({"channels": [{"t": "p", "messages": -4}]})) }),
    );
    let base = spawn_server(app);
    let client = ApiClient::new(&base);

    let err = client
        .fetch_top_channels(&PeriodSelection::Last7.resolve().params())
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
}

#[test]
fn one_endpoint_failing_leaves_the_other_intact() {
    let app = Router::new()
        .route(
            ORIGIN_PATH,
            get(|| async { Json(json!({"origins": [{"t": "d", "messages": 1}]})) }),
        )
        .route(
            TOP_CHANNELS_PATH,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "") }),
        );
    let base = spawn_server(app);
    let client = ApiClient::new(&base);

    let fetch = client.fetch_section(FetchTracker::new(PeriodSelection::Last7).ticket());
    assert!(fetch.origins.is_ok());
    assert!(matches!(fetch.channels, Err(ApiError::Status { .. })));
}

#[test]
fn unreachable_server_is_a_request_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = ApiClient::with_options(
        &format!("http://127.0.0.1:{port}"),
        Duration::from_secs(2),
        None,
    );

    let err = client
        .fetch_origins(&PeriodSelection::Last7.resolve().params())
        .unwrap_err();
    assert!(matches!(err, ApiError::Request { .. }), "got {err:?}");
}
