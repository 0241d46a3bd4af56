//! Background fetch thread.
//!
//! The UI thread sends tickets; the worker fetches immediately for every
//! ticket it receives and re-fetches the last one on a fixed interval.
//! Results flow back tagged with their ticket, so the UI can drop anything
//! issued for a period that is no longer selected.

use std::time::{Duration, Instant};

use ed_core::generation::FetchTicket;
use flume::RecvTimeoutError;

use crate::api_client::{ApiClient, SectionFetch};
use crate::app::App;

pub struct FetchWorker {
    pub requests: flume::Sender<FetchTicket>,
    pub results: flume::Receiver<SectionFetch>,
}

impl FetchWorker {
    /// Start the worker; it fetches `initial` right away.
    pub fn spawn(client: ApiClient, initial: FetchTicket, interval: Duration) -> Self {
        let (req_tx, req_rx) = flume::unbounded::<FetchTicket>();
        let (res_tx, res_rx) = flume::unbounded::<SectionFetch>();

        let spawned = std::thread::Builder::new()
            .name("ed-fetch".into())
            .spawn(move || run(client, initial, interval, req_rx, res_tx));
        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn fetch worker");
        }

        Self {
            requests: req_tx,
            results: res_rx,
        }
    }

    pub fn request(&self, ticket: FetchTicket) {
        if self.requests.send(ticket).is_err() {
            tracing::warn!("fetch worker has exited; request dropped");
        }
    }

    /// Hand the app's queued ticket to the worker and fold in whatever has
    /// arrived. Returns how many results were applied to the current period.
    pub fn pump(&self, app: &mut App) -> usize {
        if let Some(ticket) = app.take_request() {
            self.request(ticket);
        }
        let mut applied = 0;
        while let Ok(fetch) = self.results.try_recv() {
            if app.apply_fetch(fetch) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until a result for the selected period lands, or `timeout`
    /// passes. Returns at once when nothing is queued and the view already
    /// has data. A fetch error recorded before the call does not count as
    /// an answer; only a result applied during the wait does.
    ///
    /// `on_applied` runs after every applied result.
    pub fn wait_for_data(
        &self,
        app: &mut App,
        timeout: Duration,
        mut on_applied: impl FnMut(&App),
    ) -> bool {
        let queued = app.take_request();
        if let Some(ticket) = queued {
            self.request(ticket);
        } else if !app.view().is_loading() {
            return true;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.results.recv_timeout(remaining) {
                Ok(fetch) => {
                    if app.apply_fetch(fetch) {
                        on_applied(app);
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
    }
}

fn run(
    client: ApiClient,
    initial: FetchTicket,
    interval: Duration,
    requests: flume::Receiver<FetchTicket>,
    results: flume::Sender<SectionFetch>,
) {
    tracing::info!(base = client.base(), interval_secs = interval.as_secs(), "fetch worker started");
    let mut ticket = initial;

    loop {
        let fetch = client.fetch_section(ticket);
        if results.send(fetch).is_err() {
            break;
        }

        match requests.recv_timeout(interval) {
            Ok(next) => ticket = next,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        // Rapid period switching queues several tickets; only the newest matters.
        while let Ok(next) = requests.try_recv() {
            ticket = next;
        }
    }

    tracing::info!("fetch worker stopped");
}
