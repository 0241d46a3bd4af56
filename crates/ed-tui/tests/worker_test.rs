//! Fetch worker driven end to end against an in-process axum server.
//!
//! The server answers with the period's day count as the message count, so
//! each result can be matched to the period it was fetched for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde_json::json;

use ed_api_types::{ORIGIN_PATH, TOP_CHANNELS_PATH};
use ed_core::period::PeriodSelection;

#[path = "../src/api_client.rs"]
mod api_client;
#[path = "../src/app.rs"]
mod app;
#[path = "../src/worker.rs"]
mod worker;

use api_client::ApiClient;
use app::App;
use worker::FetchWorker;

const WAIT: Duration = Duration::from_secs(5);
const NO_REFRESH: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct Reports {
    /// `start` param of each period, resolved when the server was built.
    starts: Arc<Vec<(String, PeriodSelection)>>,
    /// Origin requests for this period are held back by `delay`.
    slow: Option<PeriodSelection>,
    delay: Duration,
    /// Origin requests that answer 500 before the server recovers.
    failures_left: Arc<AtomicUsize>,
    /// Periods the origin endpoint was asked for, in order.
    seen: Arc<Mutex<Vec<PeriodSelection>>>,
}

impl Reports {
    fn new() -> Self {
        let starts = PeriodSelection::ALL
            .iter()
            .map(|p| (p.resolve().params().start_iso(), *p))
            .collect();
        Self {
            starts: Arc::new(starts),
            slow: None,
            delay: Duration::ZERO,
            failures_left: Arc::default(),
            seen: Arc::default(),
        }
    }

    fn period_of(&self, query: &HashMap<String, String>) -> PeriodSelection {
        let start = query.get("start").cloned().unwrap_or_default();
        self.starts
            .iter()
            .find(|(s, _)| *s == start)
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }

    fn router(self) -> Router {
        Router::new()
            .route(ORIGIN_PATH, get(origins))
            .route(TOP_CHANNELS_PATH, get(channels))
            .with_state(self)
    }
}

async fn origins(
    State(reports): State<Reports>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let period = reports.period_of(&query);
    reports.seen.lock().unwrap().push(period);

    if reports.slow == Some(period) {
        tokio::time::sleep(reports.delay).await;
    }
    let failing = reports
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({"origins": [{"t": "p", "messages": period.days()}]})))
}

async fn channels(
    State(reports): State<Reports>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let period = reports.period_of(&query);
    Json(json!({"channels": [
        {"t": "p", "messages": period.days(), "name": period.id()}
    ]}))
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

fn start_worker(reports: Reports, app: &App) -> FetchWorker {
    let base = spawn_server(reports.router());
    FetchWorker::spawn(ApiClient::new(&base), app.section.ticket(), NO_REFRESH)
}

#[test]
fn late_result_for_previous_period_is_dropped() {
    let mut reports = Reports::new();
    reports.slow = Some(PeriodSelection::Last7);
    reports.delay = Duration::from_millis(400);

    let mut app = App::new(false, PeriodSelection::Last7);
    let worker = start_worker(reports, &app);

    // Switch while the Last7 fetch is still in flight.
    app.select_period(PeriodSelection::Last30);
    assert_eq!(worker.pump(&mut app), 0);

    let late = worker.results.recv_timeout(WAIT).expect("first result");
    assert_eq!(late.ticket.period, PeriodSelection::Last7);
    assert!(!app.apply_fetch(late));
    assert!(app.view().is_loading());

    let fresh = worker.results.recv_timeout(WAIT).expect("second result");
    assert_eq!(fresh.ticket.period, PeriodSelection::Last30);
    assert!(app.apply_fetch(fresh));

    let view = app.view();
    assert_eq!(view.origins().unwrap().private, 30);
    assert_eq!(view.channels().unwrap()[0].display_name, "last30");
}

#[test]
fn queued_tickets_collapse_to_the_newest() {
    let mut reports = Reports::new();
    reports.slow = Some(PeriodSelection::Last7);
    reports.delay = Duration::from_millis(400);
    let seen = reports.seen.clone();

    let mut app = App::new(false, PeriodSelection::Last7);
    let worker = start_worker(reports, &app);

    for period in [PeriodSelection::Last30, PeriodSelection::Last90] {
        app.select_period(period);
        let ticket = app.take_request().expect("period change queues a fetch");
        worker.request(ticket);
    }

    let late = worker.results.recv_timeout(WAIT).unwrap();
    assert_eq!(late.ticket.period, PeriodSelection::Last7);
    assert!(!app.apply_fetch(late));

    let newest = worker.results.recv_timeout(WAIT).unwrap();
    assert_eq!(newest.ticket.period, PeriodSelection::Last90);
    assert!(app.apply_fetch(newest));
    assert_eq!(app.view().origins().unwrap().private, 90);

    // Last30 was superseded before the worker got to it.
    assert!(worker
        .results
        .recv_timeout(Duration::from_millis(300))
        .is_err());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![PeriodSelection::Last7, PeriodSelection::Last90]
    );
}

#[test]
fn sync_after_failed_fetch_waits_for_the_refresh() {
    let reports = Reports::new();
    reports.failures_left.store(1, Ordering::SeqCst);

    let mut app = App::new(false, PeriodSelection::Last7);
    let worker = start_worker(reports, &app);

    // Initial fetch: origins fail, channels succeed.
    assert!(worker.wait_for_data(&mut app, WAIT, |_| {}));
    assert!(app.last_error.is_some());
    assert!(app.view().is_loading());

    // The old error must not end the wait for the refreshed result.
    app.request_refresh();
    let mut applied = 0;
    assert!(worker.wait_for_data(&mut app, WAIT, |_| applied += 1));
    assert_eq!(applied, 1);
    assert!(app.last_error.is_none());
    assert_eq!(app.view().state_name(), "loaded");

    // Data on screen and nothing queued: no wait at all.
    assert!(worker.wait_for_data(&mut app, Duration::from_millis(1), |_| {}));
}

#[test]
fn sync_times_out_when_nothing_arrives() {
    let mut reports = Reports::new();
    reports.slow = Some(PeriodSelection::Last7);
    reports.delay = Duration::from_secs(3);

    let mut app = App::new(false, PeriodSelection::Last7);
    let worker = start_worker(reports, &app);

    assert!(!worker.wait_for_data(&mut app, Duration::from_millis(200), |_| {}));
    assert!(app.view().is_loading());
}
