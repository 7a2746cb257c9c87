//! Loading client configuration from TOML, with environment overrides.
//!
//! Env variables:
//!   RUBRIC_CLIENT_CONFIG : path to a TOML file (see `ClientConfig` for the schema)
//!   RUBRIC_API_BASE_URL  : overrides `base_url`

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Subject;
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "RUBRIC_CLIENT_CONFIG";
pub const BASE_URL_ENV: &str = "RUBRIC_API_BASE_URL";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// Where `/api/generate` and `/api/next` live.
  pub base_url: String,
  pub default_subject: Subject,
  pub error_banner_ms: u64,
  pub success_banner_ms: u64,
  pub user_agent: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8000".into(),
      default_subject: Subject::Math,
      error_banner_ms: 5_000,
      success_banner_ms: 3_000,
      user_agent: concat!("rubric-client/", env!("CARGO_PKG_VERSION")).into(),
    }
  }
}

impl ClientConfig {
  pub fn error_banner_ttl(&self) -> Duration {
    Duration::from_millis(self.error_banner_ms)
  }

  pub fn success_banner_ttl(&self) -> Duration {
    Duration::from_millis(self.success_banner_ms)
  }

  pub fn from_toml_str(s: &str, path: &str) -> Result<Self, ConfigError> {
    toml::from_str::<ClientConfig>(s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
  }

  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
    Self::from_toml_str(&s, path)
  }

  /// Apply `RUBRIC_API_BASE_URL` when set and non-empty.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
      if !url.trim().is_empty() {
        self.base_url = url.trim().to_string();
      }
    }
    self
  }
}

/// Load from RUBRIC_CLIENT_CONFIG if set, then apply env overrides.
/// Read or parse errors are logged and the defaults are used.
pub fn load_client_config_from_env() -> ClientConfig {
  let base = match std::env::var(CONFIG_PATH_ENV) {
    Ok(path) => match ClientConfig::from_file(&path) {
      Ok(cfg) => {
        info!(target: "rubric_client", %path, "Loaded client config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "rubric_client", %path, error = %e, "Failed to load client config; using defaults");
        ClientConfig::default()
      }
    },
    Err(_) => ClientConfig::default(),
  };
  base.with_env_overrides()
}
