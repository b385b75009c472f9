//! Error types for textsearcher-core

use thiserror::Error;

/// Errors raised synchronously by the core building blocks.
///
/// All variants describe caller mistakes; they are reported before any
/// work is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Chunk size must be at least one line
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),

    /// Dictionary entries must be non-empty
    #[error("Invalid dictionary entry at position {position}: names must not be empty")]
    EmptyDictionaryEntry { position: usize },
}

/// Failure of a single scan task.
///
/// Never fatal for a pipeline run: the coordinator records it and treats
/// the chunk's contribution as empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Scan of chunk {chunk_index} failed: {message}")]
pub struct ScanError {
    pub chunk_index: usize,
    pub message: String,
}

impl ScanError {
    pub fn new(chunk_index: usize, message: impl Into<String>) -> Self {
        Self {
            chunk_index,
            message: message.into(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
