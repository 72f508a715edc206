use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported configuration format. Use 'yaml', 'json' or 'toml'.")]
    UnsupportedFormat,

    #[error("invalid {name} value: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Client configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `http://localhost:5000/api`.
    pub api_base_url: String,

    /// Logging level directive.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Where the bearer token is persisted; platform config dir when unset.
    pub token_path: Option<PathBuf>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
            token_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// File values win over environment variables; environment variables
    /// only fill fields still at their defaults; `api_url_override` wins
    /// over both.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed, an
    /// environment value is malformed, or the result fails validation.
    pub fn load_config(
        config_path: Option<PathBuf>,
        api_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => defaults.clone(),
        };

        if config.api_base_url == defaults.api_base_url {
            if let Ok(url) = env::var("TASKFLOW_API_URL") {
                config.api_base_url = url;
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(level) = env::var("TASKFLOW_LOG_LEVEL") {
                config.log_level = level;
            }
        }
        if config.log_format == defaults.log_format {
            if let Ok(format) = env::var("TASKFLOW_LOG_FORMAT") {
                config.log_format = format.parse().map_err(|reason| ConfigError::InvalidValue {
                    name: "TASKFLOW_LOG_FORMAT",
                    reason,
                })?;
            }
        }
        if config.token_path.is_none() {
            if let Ok(path) = env::var("TASKFLOW_TOKEN_PATH") {
                config.token_path = Some(PathBuf::from(path));
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Ok(timeout) = env::var("TASKFLOW_REQUEST_TIMEOUT") {
                config.request_timeout_secs =
                    timeout.parse().map_err(|_| ConfigError::InvalidValue {
                        name: "TASKFLOW_REQUEST_TIMEOUT",
                        reason: "must be a whole number of seconds".to_string(),
                    })?;
            }
        }

        if let Some(url) = api_url_override {
            config.api_base_url = url;
        }

        config.validate()?;
        tracing::debug!(api = %config.api_base_url, "configuration resolved");
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat),
        }
    }

    /// Checks the resolved values.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_url()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "request_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed API base URL.
    ///
    /// # Errors
    /// Returns an error when the URL does not parse or is not http(s).
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| ConfigError::InvalidValue {
            name: "api_base_url",
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "api_base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    /// Token file location, falling back to the platform config directory.
    #[must_use]
    pub fn resolved_token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(|| {
            BaseDirs::new()
                .map(|dirs| dirs.config_dir().join("taskflow").join("token"))
                .unwrap_or_else(|| PathBuf::from("./taskflow.token"))
        })
    }
}
