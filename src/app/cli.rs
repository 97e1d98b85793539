use super::logging::LogLevel;
use crate::config::{ConfigError, TargetConfig};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Ship newline-delimited JSON log records to Loggly.
#[derive(Parser, Debug, Clone)]
#[command(name = "loggly-ship", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with target settings
    #[arg(long, env = "LOGGLY_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Loggly customer token (36 characters)
    #[arg(long)]
    pub customer_token: Option<String>,

    /// Ingestion base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// CA bundle used to verify the endpoint
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Tag attached to every entry; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Send all records in a single bulk request
    #[arg(long)]
    pub bulk: bool,

    /// Attach the client address to each entry
    #[arg(long)]
    pub enable_ip: bool,

    /// Attach the trail id to each entry
    #[arg(long)]
    pub enable_trail: bool,

    /// Attach stack frames to each entry
    #[arg(long)]
    pub enable_trace: bool,

    /// Trail id; generated when omitted
    #[arg(long)]
    pub trail: Option<String>,

    /// Client address reported with --enable-ip
    #[arg(long)]
    pub remote_addr: Option<IpAddr>,

    /// File with one JSON record per line; stdin when omitted
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Settings from the config file, then `LOGGLY_*` variables, then flags.
    pub fn target_config(&self) -> Result<TargetConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => TargetConfig::from_file(path)?,
            None => TargetConfig::default(),
        };
        config.apply_env()?;

        if let Some(token) = &self.customer_token {
            config.customer_token = Some(token.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(cert) = &self.cert {
            config.cert = Some(cert.clone());
        }
        if let Some(trail) = &self.trail {
            config.trail = Some(trail.clone());
        }
        if !self.tags.is_empty() {
            config.tags = self.tags.clone();
        }
        config.bulk |= self.bulk;
        config.enable_ip |= self.enable_ip;
        config.enable_trail |= self.enable_trail;
        config.enable_trace |= self.enable_trace;

        // A one-shot process has no client request to release
        config.finish_request = false;

        Ok(config)
    }
}
