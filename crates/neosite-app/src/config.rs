//! App configuration.
//!
//! Loaded from a TOML file (`NEOSITE_CONFIG` env var, or `neosite.toml` in
//! the working directory). Every field has a default so the binary runs
//! with no file present, in offline mode.

use std::io;

use serde::Deserialize;

use neosite_types::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Remote API base URL. Absent = offline in-memory services.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Owner password accepted by the offline auth simulation.
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: "redpill".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub login_limit: u32,
    pub login_window_secs: u64,
    pub note_limit: u32,
    pub note_window_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            login_limit: 5,
            login_window_secs: 300,
            note_limit: 3,
            note_window_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from `NEOSITE_CONFIG` or `neosite.toml`; defaults when absent.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("NEOSITE_CONFIG").unwrap_or_else(|_| "neosite.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("loaded config from {path}");
                Ok(toml::from_str(&text)?)
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no config at {path}, using defaults");
                Ok(Self::default())
            },
            Err(e) => Err(e.into()),
        }
    }
}
