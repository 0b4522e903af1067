use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory under the per-user config dir holding client state.
pub const APP_DIR: &str = "magnificent_messageboard";
pub const DEFAULT_BASE_URL: &str = "http://messageboard.hoppy.haus";
pub const DEFAULT_USER_AGENT: &str = "MagnificentMessageboard (S-Robert.Roberts@lwtech.edu) 1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// API host, e.g. `http://messageboard.hoppy.haus`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `User-Agent` on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Where the tripcode lives; defaults to the per-user config dir
    #[serde(default)]
    pub identity_path: Option<PathBuf>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout_secs(),
            identity_path: None,
        }
    }
}

impl FrontendConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise the default config file if one exists,
    /// otherwise the built-in defaults. Environment overrides are applied last.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_from(|key| env::var(key).ok());
        Ok(config)
    }

    /// Applies `MMB_*` overrides; blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());
        if let Some(base_url) = lookup("MMB_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(user_agent) = lookup("MMB_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Some(secs) = lookup("MMB_TIMEOUT_SECS").and_then(|raw| raw.trim().parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(path) = lookup("MMB_IDENTITY_PATH") {
            self.identity_path = Some(PathBuf::from(path));
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        sanitize_base_url(&self.base_url)
    }

    pub fn identity_path(&self) -> PathBuf {
        self.identity_path
            .clone()
            .unwrap_or_else(|| app_dir().join("identity.toml"))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn sanitize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut base = raw.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    let url = Url::parse(&base).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}
