//! `reqwest`-backed [`Fetcher`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Instant;

use crate::config::FetchConfig;
use crate::errors::HarvestError;
use crate::protocols::{FetchResult, Fetcher};

/// HTTP fetcher using a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Builds a client from the fetch configuration.
    pub fn new(config: FetchConfig) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| HarvestError::Config(format!("invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HarvestError::Config(format!("invalid value for header '{key}': {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| HarvestError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, HarvestError> {
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| HarvestError::transport(url, e.to_string()))?;

        Ok(FetchResult {
            status_code: status.as_u16(),
            text,
            final_url,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_defaults() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.config().timeout_seconds, 30.0);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config = FetchConfig::new().with_header("bad header", "x");
        assert!(matches!(HttpFetcher::new(config), Err(HarvestError::Config(_))));
    }
}
