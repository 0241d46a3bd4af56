//! Blocking HTTP client for the engagement-dashboard reporting endpoints.
//!
//! All methods use `reqwest::blocking` so they can be called from the
//! background fetch thread without an async runtime.

use std::time::{Duration, Instant};

use ed_api_types::{
    OriginsResponse, PeriodParams, TopChannelsResponse, ORIGIN_PATH, TOP_CHANNELS_PATH,
};
use ed_core::config::{ApiConfig, CredentialProvider, Credentials};
use ed_core::generation::FetchTicket;
use ed_core::period::DateRange;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("GET {path}: {source}")]
    Request {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {path}: HTTP {status}")]
    Status {
        path: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("GET {path} parse: {source}")]
    Decode {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Both payloads for one ticket. The two requests run concurrently and
/// fail independently.
#[derive(Debug)]
pub struct SectionFetch {
    pub ticket: FetchTicket,
    pub range: DateRange,
    pub origins: Result<OriginsResponse, ApiError>,
    pub channels: Result<TopChannelsResponse, ApiError>,
}

/// Reusable blocking client + base URL.
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base: String,
    credentials: Option<Credentials>,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self::with_options(base, Duration::from_secs(5), None)
    }

    /// Client for the configured server; credentials come from the env vars
    /// named in the config.
    pub fn from_config(api: &ApiConfig, base_override: Option<&str>) -> Self {
        Self::with_options(
            base_override.unwrap_or(&api.base_url),
            Duration::from_secs(api.timeout_secs),
            CredentialProvider::credentials(api),
        )
    }

    pub fn with_options(base: &str, timeout: Duration, credentials: Option<Credentials>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn get<T: DeserializeOwned>(&self, path: &'static str, params: &PeriodParams) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base, path);
        let mut request = self
            .client
            .get(&url)
            .query(params)
            .header("Accept", "application/json");
        if let Some(creds) = &self.credentials {
            request = request
                .header("X-User-Id", &creds.user_id)
                .header("X-Auth-Token", &creds.auth_token);
        }

        let resp = request
            .send()
            .map_err(|source| ApiError::Request { path, source })?;
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                path,
                status: resp.status(),
            });
        }
        resp.json::<T>()
            .map_err(|source| ApiError::Decode { path, source })
    }

    pub fn fetch_origins(&self, params: &PeriodParams) -> Result<OriginsResponse, ApiError> {
        self.get(ORIGIN_PATH, params)
    }

    pub fn fetch_top_channels(&self, params: &PeriodParams) -> Result<TopChannelsResponse, ApiError> {
        self.get(TOP_CHANNELS_PATH, params)
    }

    /// Fetch both payloads for the ticket's period, resolved right now.
    pub fn fetch_section(&self, ticket: FetchTicket) -> SectionFetch {
        self.fetch_section_for(ticket, ticket.range())
    }

    pub fn fetch_section_for(&self, ticket: FetchTicket, range: DateRange) -> SectionFetch {
        let params = range.params();
        let started = Instant::now();

        let (origins, channels) = std::thread::scope(|scope| {
            let origins = scope.spawn(|| timed_fetch("origins", || self.fetch_origins(&params)));
            let channels =
                scope.spawn(|| timed_fetch("top_channels", || self.fetch_top_channels(&params)));
            (join(origins), join(channels))
        });

        tracing::debug!(
            generation = %ticket.generation,
            period = %ticket.period,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "section fetch complete"
        );

        SectionFetch {
            ticket,
            range,
            origins,
            channels,
        }
    }
}

fn join<T>(handle: std::thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn timed_fetch<T, F>(label: &'static str, fetch: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let out = fetch();
    tracing::trace!(endpoint = label, elapsed_ms = started.elapsed().as_millis() as u64, "fetch");
    out
}
