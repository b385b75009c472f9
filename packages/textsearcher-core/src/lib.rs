/*
 * Textsearcher Core - Dictionary Name Search Domain
 *
 * Synchronous building blocks of the matching pipeline:
 * - dictionary/ : Immutable set of target names
 * - chunker/    : Content → fixed-size line chunks
 * - scanner/    : Chunk → chunk-local match index
 * - rebase/     : Chunk-local → document-global coordinates
 * - aggregate/  : Ordered append-merge of chunk results
 *
 * Scheduling lives in textsearcher-orchestration; nothing here spawns
 * threads or touches an async runtime.
 */

pub mod aggregate;
pub mod chunker;
pub mod dictionary;
pub mod error;
pub mod model;
pub mod rebase;
pub mod scanner;

// Re-exports
pub use aggregate::{merge, Aggregator};
pub use chunker::{chunk_lines, Chunk, LineChunker};
pub use dictionary::{Dictionary, PERSON_NAMES};
pub use error::{CoreError, Result, ScanError};
pub use model::{AggregatedIndex, MatchEntry, MatchIndex, TextPosition};
pub use rebase::{rebase, rebase_position};
pub use scanner::{MatchMode, Scanner, SubstringScanner, WordScanner};
