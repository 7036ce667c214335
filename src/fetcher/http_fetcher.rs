use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::app::{Result, TributaryError};
use crate::config::HttpConfig;
use crate::fetcher::{Fetcher, Proxy};

/// Envelope returned by an allorigins-style relay.
#[derive(Debug, Deserialize)]
struct RelayResponse {
    contents: Option<String>,
    #[serde(default)]
    status: Option<RelayStatus>,
}

#[derive(Debug, Deserialize)]
struct RelayStatus {
    http_code: Option<u16>,
}

pub struct HttpFetcher {
    client: Client,
    proxy: Option<Proxy>,
}

impl HttpFetcher {
    /// Fetch through `proxy`, or straight from the origin when `None`.
    pub fn new(config: &HttpConfig, proxy: Option<Proxy>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, proxy })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let Some(proxy) = &self.proxy else {
            tracing::debug!("Fetching {}", url);
            return self.get_text(url).await;
        };

        let proxied = proxy.proxied_url(url);
        tracing::debug!("Fetching {} via {}", url, proxy.base());

        let body = self.get_text(proxied.as_str()).await?;
        let relay: RelayResponse = serde_json::from_str(&body)
            .map_err(|e| TributaryError::Network(format!("Malformed relay response: {}", e)))?;

        if let Some(code) = relay.status.and_then(|s| s.http_code) {
            if !(200..300).contains(&code) {
                return Err(TributaryError::Network(format!(
                    "{} answered with HTTP {}",
                    url, code
                )));
            }
        }

        relay
            .contents
            .ok_or_else(|| TributaryError::Network(format!("Relay returned no contents for {}", url)))
    }
}
