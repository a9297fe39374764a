//! Shared HTTP client with a bounded per-call timeout.

use bytes::Bytes;
use parkpal_common::{ParkPalError, ParkPalResult};
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

/// Settings shared by every upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Per-call timeout covering connect, headers and body.
    pub timeout: Duration,
    /// Identifying client header sent with each request.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(4000),
            user_agent: "ParkPal/1.0".to_string(),
        }
    }
}

/// Thin wrapper over [`reqwest::Client`] that maps failures onto
/// [`ParkPalError`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &UpstreamConfig) -> ParkPalResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ParkPalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET a URL and return the body of a 2xx response.
    pub async fn get_bytes(&self, url: &str, query: &[(&str, String)]) -> ParkPalResult<Bytes> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Upstream returned error status");
            return Err(ParkPalError::UpstreamStatus(status.as_u16()));
        }

        resp.bytes().await.map_err(map_transport_error)
    }
}

fn map_transport_error(err: reqwest::Error) -> ParkPalError {
    if err.is_timeout() {
        ParkPalError::Timeout
    } else {
        ParkPalError::UpstreamTransport(err.to_string())
    }
}
