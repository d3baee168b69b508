use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::normalize_url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
const ENV_API_BASE_URL: &str = "TASKEVO_API_BASE_URL";
const ENV_LOOKUP_FAILURE: &str = "TASKEVO_ON_LOOKUP_FAILURE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// What to do when the conversation lookup before a chat send fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LookupFailurePolicy {
    /// Fail the send; nothing is posted.
    #[default]
    Abort,
    /// Post without a conversation id and let the backend open a new one.
    Proceed,
}

impl FromStr for LookupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "proceed" => Ok(Self::Proceed),
            other => Err(format!("expected `abort` or `proceed`, got `{other}`")),
        }
    }
}

impl TryFrom<String> for LookupFailurePolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LookupFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Proceed => "proceed",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub on_lookup_failure: LookupFailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            chat: ChatConfig::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("dev", "taskevo", "taskevo")?;
        Some(proj.config_dir().join("config.toml"))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        let mut config: Config = toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.api_base_url = normalize_url(&config.api_base_url);
        Ok(config)
    }

    /// Load from the platform config dir, then apply environment overrides.
    /// A broken file is reported and ignored.
    pub fn load() -> Self {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("{e}; using defaults");
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = normalize_url(&url);
        }
        if let Some(raw) = lookup(ENV_LOOKUP_FAILURE) {
            match raw.parse() {
                Ok(policy) => self.chat.on_lookup_failure = policy,
                Err(e) => warn!("ignoring {ENV_LOOKUP_FAILURE}: {e}"),
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
