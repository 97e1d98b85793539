use super::{CUSTOMER_TOKEN_LEN, ConfigError, TargetConfig, TimestampZone};
use crate::endpoint::build_url;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// CA bundle shipped with the crate, used when no `cert` is configured.
pub const BUNDLED_CERT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/certs/cert.pem");

/// Validated exporter settings. The endpoint URL is computed once here and
/// never changes afterwards.
#[derive(Debug, Clone)]
pub struct TargetSettings {
    pub customer_token: String,
    pub base_url: String,
    pub cert: PathBuf,
    pub enable_ip: bool,
    pub enable_trail: bool,
    pub enable_trace: bool,
    pub trail: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub tags: Vec<String>,
    pub bulk: bool,
    pub finish_request: bool,
    pub timestamp_zone: TimestampZone,
    url: String,
}

impl TargetSettings {
    /// The ingestion URL including token and tags.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TargetConfig {
    pub fn validate(self) -> Result<TargetSettings, ConfigError> {
        // Validate customer token
        let customer_token = self.customer_token.ok_or(ConfigError::MissingToken)?;
        // Measured in bytes; the token goes into the URL path unencoded
        let length = customer_token.len();
        if length != CUSTOMER_TOKEN_LEN {
            return Err(ConfigError::InvalidToken { length });
        }

        // Resolve certificate
        let cert = self.cert.unwrap_or_else(|| PathBuf::from(BUNDLED_CERT));
        if !cert.is_file() {
            return Err(ConfigError::CertificateNotFound(cert));
        }

        // Validate base URL
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        let trail = match self.trail {
            Some(trail) if !trail.is_empty() => trail,
            _ => generate_trail(),
        };

        let url = build_url(&self.base_url, self.bulk, &customer_token, &self.tags);

        Ok(TargetSettings {
            customer_token,
            base_url: self.base_url,
            cert,
            enable_ip: self.enable_ip,
            enable_trail: self.enable_trail,
            enable_trace: self.enable_trace,
            trail,
            connect_timeout: self.connect_timeout,
            timeout: self.timeout,
            tags: self.tags,
            bulk: self.bulk,
            finish_request: self.finish_request,
            timestamp_zone: self.timestamp_zone,
            url,
        })
    }
}

/// Random 32 hex character correlation id. Unique enough to tell processes
/// apart; not meant as a secret.
pub fn generate_trail() -> String {
    Uuid::new_v4().simple().to_string()
}
