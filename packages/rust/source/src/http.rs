//! Live page source over HTTP.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use qaharvest_shared::{FetchConfig, HarvestError, Result};

use crate::{PageSource, RenderedPage};

/// Maximum response size we accept for a single page (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Build a reqwest client with the configured UA, timeout and redirect limit.
pub fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| HarvestError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetches pages with a plain HTTP GET.
///
/// The returned HTML is the server response as-is; pages that only render
/// their content client-side need a different source.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    max_bytes: u64,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(config)?))
    }

    /// Wrap an existing client (shared connection pool).
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_bytes: MAX_RESPONSE_SIZE,
        }
    }

    /// Override the per-page body size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl PageSource for HttpSource {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<RenderedPage> {
        debug!("fetching page");

        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HarvestError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Network(format!("{url}: HTTP {status}")));
        }

        let max = self.max_bytes;
        if let Some(len) = response.content_length() {
            if len > max {
                return Err(HarvestError::validation(format!(
                    "{url}: response too large ({len} bytes, max {max})"
                )));
            }
        }

        // Content-Length may be absent (chunked), so the cap is also checked while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| HarvestError::Network(format!("{url}: body read failed: {e}")))?
        {
            if body.len() as u64 + chunk.len() as u64 > max {
                return Err(HarvestError::validation(format!(
                    "{url}: response too large (over {max} bytes)"
                )));
            }
            body.extend_from_slice(&chunk);
        }
        let html = String::from_utf8_lossy(&body).into_owned();

        debug!(bytes = html.len(), "page fetched");

        Ok(RenderedPage {
            url: url.clone(),
            html,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
