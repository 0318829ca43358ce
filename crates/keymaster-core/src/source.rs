//! Remote text sources
//!
//! The manifest and the control token are both small text documents. They
//! are fetched through [`TextSource`] so that components receive an
//! explicitly constructed client instead of sharing global state.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::NetworkConfig;

/// Fetches a remote document as text
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// [`TextSource`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Build a client with the configured timeout and user agent
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = build_client(network)?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl TextSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "Request to {} failed with status: {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// Build the HTTP client shared by a component's requests.
///
/// The timeout bounds connecting and each individual read, never the whole
/// transfer, so a slow but steady download still completes.
pub fn build_client(network: &NetworkConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&network.user_agent)
        .connect_timeout(network.timeout())
        .read_timeout(network.timeout())
        .build()
        .map_err(|e| Error::network(format!("Failed to create HTTP client: {}", e)))
}
