use async_trait::async_trait;
use serde_json::Value;

use crate::config::CatalogConfig;

/// Failures surfaced by a [`Transport`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::HttpStatus { status: 404, .. })
    }
}

/// Fetches JSON documents from the remote catalog
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL every relative path is resolved against
    fn base_url(&self) -> &str;

    /// GET a path (relative to [`Transport::base_url`]) or an absolute URL
    async fn get(&self, path: &str) -> Result<Value, TransportError>;
}

/// reqwest-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &CatalogConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(url.to_string())
    } else if err.is_decode() {
        TransportError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        TransportError::Network(format!("{}: {}", url, err))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        let url = self.url_for(path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        if !response.status().is_success() {
            return Err(TransportError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        response.json::<Value>().await.map_err(|e| classify(&url, e))
    }
}
