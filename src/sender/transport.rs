use crate::config::TargetSettings;
use reqwest::Certificate;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[cfg(test)]
use mockall::automock;

const USER_AGENT: &str = concat!("loggly-target/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to read certificate bundle '{path}': {source}", path = .path.display())]
    CertificateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid certificate bundle: {0}")]
    Certificate(String),
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A connection to the ingestion endpoint.
///
/// Implementations are owned by a single exporter and used sequentially.
#[cfg_attr(test, automock)]
pub trait Transport: Send {
    /// POSTs `body` to the endpoint and returns the response status.
    fn post(&mut self, body: String) -> Result<u16, DeliveryError>;
}

/// Blocking HTTPS transport that only trusts the configured CA bundle.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    pub fn connect(settings: &TargetSettings) -> Result<Self, DeliveryError> {
        let url = Url::parse(settings.url())?;
        let roots = load_ca_bundle(&settings.cert)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Peer and hostname verification stay on; only the bundle is trusted
        let mut client_builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .default_headers(headers)
            .user_agent(USER_AGENT);

        for root in roots {
            client_builder = client_builder.add_root_certificate(root);
        }

        let client = client_builder
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        debug!(
            "Opened connection to {} (connect timeout {:?}, timeout {:?})",
            url.host_str().unwrap_or("<no host>"),
            settings.connect_timeout,
            settings.timeout
        );

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn post(&mut self, body: String) -> Result<u16, DeliveryError> {
        let response = self.client.post(self.url.clone()).body(body).send()?;
        let status = response.status().as_u16();

        // Drain the body so the connection can be reused. The server has
        // answered at this point, so a broken body does not fail the request.
        if let Err(e) = response.bytes() {
            debug!("Failed to drain response body (status {}): {}", status, e);
        }

        Ok(status)
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, DeliveryError> {
    let pem = std::fs::read(path).map_err(|source| DeliveryError::CertificateRead {
        path: path.to_path_buf(),
        source,
    })?;

    let certs =
        Certificate::from_pem_bundle(&pem).map_err(|e| DeliveryError::Certificate(e.to_string()))?;
    if certs.is_empty() {
        return Err(DeliveryError::Certificate(format!(
            "no certificates found in '{}'",
            path.display()
        )));
    }

    Ok(certs)
}
