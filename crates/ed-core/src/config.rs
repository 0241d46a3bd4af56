use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::period::PeriodSelection;

/// Top-level configuration loaded from `~/.engagement-dashboard/config.toml`.
///
/// **Security**: This struct NEVER stores the REST credentials. It only
/// names the env vars they are read from; see [`CredentialProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `~/.engagement-dashboard/config.toml`, falling back
    /// to defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Semantic validation for settings that are not fully expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".engagement-dashboard")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Chat server root, e.g. `https://chat.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How often the terminal section re-fetches the current period.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Env var holding the REST user id (default: `ED_USER_ID`).
    #[serde(default = "default_user_id_env")]
    pub user_id_env: String,
    /// Env var holding the REST auth token (default: `ED_AUTH_TOKEN`).
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            user_id_env: default_user_id_env(),
            auth_token_env: default_auth_token_env(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "api.refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".into()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_refresh_interval_secs() -> u64 {
    30
}
fn default_user_id_env() -> String {
    "ED_USER_ID".into()
}
fn default_auth_token_env() -> String {
    "ED_AUTH_TOKEN".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Period selected on startup: `last7`, `last30` or `last90`.
    #[serde(default = "default_period_id")]
    pub default_period: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_period: default_period_id(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_period
            .parse::<PeriodSelection>()
            .map(|_| ())
            .map_err(|e| ConfigError::Validation(format!("dashboard.default_period: {e}")))
    }

    /// The configured startup period; falls back to the default when the
    /// value was never validated.
    pub fn period(&self) -> PeriodSelection {
        self.default_period.parse().unwrap_or_default()
    }
}

fn default_period_id() -> String {
    PeriodSelection::default().id().into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// REST credentials sent as `X-User-Id` / `X-Auth-Token`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub auth_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("auth_token", &"***")
            .finish()
    }
}

/// Resolves credentials from the environment at runtime.
pub struct CredentialProvider;

impl CredentialProvider {
    /// Read a credential from a named env var; empty values count as unset.
    pub fn from_env(var_name: &str) -> Option<String> {
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Both halves of the REST login, or `None` if either is missing.
    pub fn credentials(api: &ApiConfig) -> Option<Credentials> {
        Some(Credentials {
            user_id: Self::from_env(&api.user_id_env)?,
            auth_token: Self::from_env(&api.auth_token_env)?,
        })
    }
}
