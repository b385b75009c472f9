//! Content sources
//!
//! A source produces the full text of one document as an in-memory string.
//! Everything downstream of [`ContentSource::fetch`] works on that string;
//! the pipeline never sees transport details.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Identifier used in logs and sink output
    fn id(&self) -> &str;

    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Content already in memory
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: String,
    content: String,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        Ok(self.content.clone())
    }
}

/// UTF-8 file on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    id: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.id.clone(),
                source,
            })
    }
}

/// Resolve a CLI-style location: `http(s)://` URLs become HTTP sources,
/// anything else is a file path.
pub fn open(location: &str) -> Result<Box<dyn ContentSource>, FetchError> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        open_url(location)
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

#[cfg(feature = "http")]
fn open_url(location: &str) -> Result<Box<dyn ContentSource>, FetchError> {
    Ok(Box::new(crate::http::HttpSource::new(location)?))
}

#[cfg(not(feature = "http"))]
fn open_url(location: &str) -> Result<Box<dyn ContentSource>, FetchError> {
    Err(FetchError::InvalidUrl {
        url: location.to_string(),
        reason: "built without the `http` feature".to_string(),
    })
}
