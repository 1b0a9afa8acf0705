use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::openai::DEFAULT_ENDPOINT;
use crate::vocab::{MAX_SENTENCES, parse_sentence_count};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_sentence_count")]
    pub default_sentence_count: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_success_status_ms")]
    pub success_status_ms: u64,
    #[serde(default = "default_error_status_ms")]
    pub error_status_ms: u64,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_credential_file() -> PathBuf {
    PathBuf::from("api.json")
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_request_timeout_secs() -> u64 {
    130
}
fn default_sentence_count() -> String {
    "2".to_string()
}
fn default_history_limit() -> usize {
    200
}
fn default_success_status_ms() -> u64 {
    2000
}
fn default_error_status_ms() -> u64 {
    4000
}
fn default_file_extension() -> String {
    "txt".to_string()
}
fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocabq")
        .join("vocabq.log")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            credential_file: default_credential_file(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            default_sentence_count: default_sentence_count(),
            history_limit: default_history_limit(),
            success_status_ms: default_success_status_ms(),
            error_status_ms: default_error_status_ms(),
            file_extension: default_file_extension(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `path`, or the per-user config file when `None`.
    /// A missing or unparsable file yields defaults; only an unreadable one
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)?;
        match toml::from_str::<Config>(&content) {
            Ok(config) => Ok(config.validated()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed config file");
                Ok(Config::default())
            }
        }
    }

    /// Replace values the UI could never accept with their defaults.
    fn validated(mut self) -> Self {
        match parse_sentence_count(&self.default_sentence_count) {
            Some(n) => self.default_sentence_count = n.to_string(),
            None => {
                warn!(
                    value = %self.default_sentence_count,
                    "default_sentence_count must be 1-{MAX_SENTENCES}; using default"
                );
                self.default_sentence_count = default_sentence_count();
            }
        }
        self
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocabq")
            .join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn success_status_delay(&self) -> Duration {
        Duration::from_millis(self.success_status_ms)
    }

    pub fn error_status_delay(&self) -> Duration {
        Duration::from_millis(self.error_status_ms)
    }
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    chatgpt_api_key: String,
}

/// Read the backend API key once at boot. Any failure degrades to an empty
/// key, which disables generation but never aborts startup.
pub fn load_credential(path: &Path) -> String {
    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_json::from_str::<CredentialFile>(&content)?));
    match parsed {
        Ok(file) => file.chatgpt_api_key.trim().to_string(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load API key");
            String::new()
        }
    }
}
