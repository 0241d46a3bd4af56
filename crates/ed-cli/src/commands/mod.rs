pub mod messages;
pub mod range;

use std::time::Duration;

use ed_api_types::PeriodParams;
use ed_core::config::Credentials;
use serde::de::DeserializeOwned;

/// Where the reporting server lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl Endpoint {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            credentials: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Build a reqwest client with the endpoint's timeout.
pub fn api_client(endpoint: &Endpoint) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Map common reqwest errors to user-friendly messages.
pub fn friendly_error(err: reqwest::Error) -> anyhow::Error {
    if err.is_connect() {
        anyhow::anyhow!(
            "Could not connect to the reporting server. Is it running?\n  \
             (hint: check --api-url or `[api] base_url` in the config)"
        )
    } else if err.is_timeout() {
        anyhow::anyhow!("Request timed out. The server may be overloaded.")
    } else if err.is_decode() {
        anyhow::anyhow!("Unexpected response from the server: {err}")
    } else {
        anyhow::anyhow!("API request failed: {err}")
    }
}

/// GET `path` with the period bounds and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    path: &str,
    params: &PeriodParams,
) -> anyhow::Result<T> {
    let mut request = client.get(endpoint.url(path)).query(params);
    if let Some(creds) = &endpoint.credentials {
        request = request
            .header("X-User-Id", &creds.user_id)
            .header("X-Auth-Token", &creds.auth_token);
    }

    let resp = request.send().await.map_err(friendly_error)?;
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        anyhow::bail!(
            "{path}: HTTP {status}\n  (hint: check the credentials in the env vars named by `[api] user_id_env` / `auth_token_env`)"
        );
    }
    if !status.is_success() {
        anyhow::bail!("{path}: HTTP {status}");
    }
    resp.json().await.map_err(friendly_error)
}
