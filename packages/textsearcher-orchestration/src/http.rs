//! HTTP content source (`http` feature)

use crate::source::{ContentSource, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept only absolute `http`/`https` URLs with a host
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

/// GET one URL and use the response body as the document
#[derive(Debug, Clone)]
pub struct HttpSource {
    id: String,
    url: Url,
    client: Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let url = validate_url(url)?;
        Ok(Self {
            id: url.to_string(),
            url,
            client: Client::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "fetching");

        let response = self
            .client
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.id.clone(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/big.txt").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(validate_url("ftp://example.com/big.txt").is_err());
        assert!(validate_url("example.com/big.txt").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_source_id_is_normalized_url() {
        let source = HttpSource::new("https://example.com").unwrap();
        assert_eq!(source.id(), "https://example.com/");
    }
}
