//! Target configuration: raw settings as read from files or the environment,
//! and the validated, immutable form the exporter runs with.

pub mod serde_helpers;
mod validation;

use serde::Deserialize;
use serde_helpers::{
    load_env_list, load_env_path_opt, load_env_secs, load_env_string, load_env_string_opt,
    load_env_var,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use validation::{BUNDLED_CERT, TargetSettings, generate_trail};

pub const DEFAULT_BASE_URL: &str = "https://logs-01.loggly.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const CUSTOMER_TOKEN_LEN: usize = 36;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Loggly customer token is not set")]
    MissingToken,
    #[error("Loggly customer token must be a valid 36 character string, got {length} bytes")]
    InvalidToken { length: usize },
    #[error("Certificate file '{}' not found", .0.display())]
    CertificateNotFound(PathBuf),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Clock used to render record timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Utc,
    Local,
}

impl std::str::FromStr for TimestampZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" => Ok(TimestampZone::Utc),
            "local" => Ok(TimestampZone::Local),
            other => Err(format!("unknown timestamp zone '{other}', expected utc or local")),
        }
    }
}

/// Raw exporter settings.
///
/// Keys are snake_case; the camelCase spellings used by older host
/// configurations are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    #[serde(alias = "customerToken")]
    pub customer_token: Option<String>,
    #[serde(alias = "baseUrl")]
    pub base_url: String,
    /// CA bundle used to verify the endpoint; the bundled file when unset.
    pub cert: Option<PathBuf>,
    #[serde(alias = "enableIp")]
    pub enable_ip: bool,
    #[serde(alias = "enableTrail")]
    pub enable_trail: bool,
    #[serde(alias = "enableTrace")]
    pub enable_trace: bool,
    /// Correlation id attached to every entry; generated when unset.
    pub trail: Option<String>,
    #[serde(alias = "connectTimeout", with = "serde_helpers::seconds")]
    pub connect_timeout: Duration,
    #[serde(with = "serde_helpers::seconds")]
    pub timeout: Duration,
    pub tags: Vec<String>,
    pub bulk: bool,
    #[serde(alias = "finishRequest")]
    pub finish_request: bool,
    #[serde(alias = "timestampZone")]
    pub timestamp_zone: TimestampZone,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            customer_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cert: None,
            enable_ip: false,
            enable_trail: false,
            enable_trace: false,
            trail: None,
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tags: Vec::new(),
            bulk: false,
            finish_request: true,
            timestamp_zone: TimestampZone::Utc,
        }
    }
}

impl TargetConfig {
    /// Shorthand for a default configuration carrying `customer_token`.
    pub fn with_token(customer_token: impl Into<String>) -> Self {
        Self {
            customer_token: Some(customer_token.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overrides fields from `LOGGLY_*` environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        load_env_string_opt("LOGGLY_CUSTOMER_TOKEN", &mut self.customer_token);
        load_env_string("LOGGLY_BASE_URL", &mut self.base_url);
        load_env_path_opt("LOGGLY_CERT", &mut self.cert);
        load_env_var("LOGGLY_ENABLE_IP", &mut self.enable_ip)?;
        load_env_var("LOGGLY_ENABLE_TRAIL", &mut self.enable_trail)?;
        load_env_var("LOGGLY_ENABLE_TRACE", &mut self.enable_trace)?;
        load_env_string_opt("LOGGLY_TRAIL", &mut self.trail);
        load_env_secs("LOGGLY_CONNECT_TIMEOUT", &mut self.connect_timeout)?;
        load_env_secs("LOGGLY_TIMEOUT", &mut self.timeout)?;
        load_env_list("LOGGLY_TAGS", &mut self.tags);
        load_env_var("LOGGLY_BULK", &mut self.bulk)?;
        load_env_var("LOGGLY_FINISH_REQUEST", &mut self.finish_request)?;
        load_env_var("LOGGLY_TIMESTAMP_ZONE", &mut self.timestamp_zone)?;
        Ok(())
    }
}
