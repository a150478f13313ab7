use crate::types::{AggregatorError, FetchConfig, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Single-attempt HTTP client shared by every source.
///
/// Requests are bounded by the configured timeout and never retried: a slow
/// or failing endpoint costs its source one empty contribution, nothing more.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching {}", url);

        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit = self.limit_bytes();
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(self.too_large(url));
        }

        // Content-Length is absent on chunked and decompressed bodies, so the
        // limit is also enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        let content = String::from_utf8_lossy(&body).into_owned();

        info!(
            "Fetched {} ({} bytes in {}ms)",
            url.path(),
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }

    fn limit_bytes(&self) -> u64 {
        self.config.max_response_mb as u64 * 1024 * 1024
    }

    fn too_large(&self, url: &Url) -> AggregatorError {
        AggregatorError::ResponseTooLarge {
            url: url.to_string(),
            limit_mb: self.config.max_response_mb,
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let content = self.fetch_text(url).await?;
        serde_json::from_str(&content)
            .map_err(|e| AggregatorError::Parse(format!("Invalid JSON from {}: {}", url.path(), e)))
    }
}
