use crate::config::ConfigError;
use crate::source::FetchError;
use textsearcher_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Invocation-level failures.
///
/// Chunk-level scan failures are not represented here: they are isolated
/// and reported as [`crate::report::ChunkFailure`] inside a successful
/// [`crate::report::ScanReport`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout: pipeline run exceeded {deadline_ms}ms")]
    Timeout { deadline_ms: u64 },

    #[error("Pipeline run cancelled")]
    Cancelled,

    #[error("Worker pool is shut down")]
    PoolShutdown,

    #[error("Worker pool could not be built: {0}")]
    PoolBuild(String),

    #[error("Content for '{source_id}' could not be obtained: {error}")]
    Fetch {
        source_id: String,
        #[source]
        error: FetchError,
    },

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    pub fn invalid_input<E: std::fmt::Display>(e: E) -> Self {
        Self::InvalidInput(e.to_string())
    }

    pub fn serialization<E: std::fmt::Display>(e: E) -> Self {
        Self::Serialization(e.to_string())
    }

    pub fn sink<E: std::fmt::Display>(e: E) -> Self {
        Self::Sink(e.to_string())
    }

    /// Retry classification for callers
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Timeout { .. } | Self::Fetch { .. } => ErrorCategory::Transient,
            Self::InvalidInput(_) | Self::Config(_) | Self::Serialization(_) | Self::Cancelled => {
                ErrorCategory::Permanent
            }
            Self::PoolShutdown | Self::PoolBuild(_) | Self::Sink(_) | Self::Io(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Error category for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Transient error - worth retrying (e.g., timeout, unreachable source)
    Transient,
    /// Permanent error - retrying gives the same result (e.g., invalid input)
    Permanent,
    /// Infrastructure error - process-level problem (e.g., pool shut down)
    Infrastructure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
            ErrorCategory::Infrastructure => "infrastructure",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "transient" => Ok(ErrorCategory::Transient),
            "permanent" => Ok(ErrorCategory::Permanent),
            "infrastructure" => Ok(ErrorCategory::Infrastructure),
            _ => Err(PipelineError::invalid_input(format!(
                "Invalid error category: {}",
                s
            ))),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transient)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_roundtrip() {
        for category in &[
            ErrorCategory::Transient,
            ErrorCategory::Permanent,
            ErrorCategory::Infrastructure,
        ] {
            let parsed = ErrorCategory::from_str(category.as_str()).unwrap();
            assert_eq!(*category, parsed);
        }
        assert!(ErrorCategory::from_str("invalid").is_err());
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            PipelineError::Timeout { deadline_ms: 10 }.category(),
            ErrorCategory::Transient
        );
        assert_eq!(
            PipelineError::from(CoreError::InvalidChunkSize(0)).category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            PipelineError::PoolShutdown.category(),
            ErrorCategory::Infrastructure
        );
        assert!(PipelineError::Timeout { deadline_ms: 1 }
            .category()
            .is_retryable());
    }

    #[test]
    fn test_core_error_becomes_invalid_input() {
        let err = PipelineError::from(CoreError::InvalidChunkSize(0));
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(err.to_string().contains("chunk size"));
    }
}
