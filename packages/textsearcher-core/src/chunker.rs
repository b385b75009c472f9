//! Line chunking
//!
//! Splits content into ordered groups of at most `chunk_size` lines. Each
//! chunk remembers where its first line sits in the original document so
//! scan results can be rebased without looking at sibling chunks.

use crate::error::{CoreError, Result};

/// Ordered slice of a document's lines, scanned as one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in document order
    pub index: usize,
    pub lines: Vec<String>,
    /// Line number of `lines[0]` in the original document
    pub start_line_offset: usize,
}

impl Chunk {
    pub fn new(index: usize, lines: Vec<String>, start_line_offset: usize) -> Self {
        Self {
            index,
            lines,
            start_line_offset,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Global line number one past the last line of this chunk
    pub fn end_line_offset(&self) -> usize {
        self.start_line_offset + self.lines.len()
    }
}

/// Fixed-size line chunker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChunker {
    chunk_size: usize,
}

impl LineChunker {
    /// Create a chunker emitting at most `chunk_size` lines per chunk.
    ///
    /// # Errors
    /// [`CoreError::InvalidChunkSize`] if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CoreError::InvalidChunkSize(chunk_size));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `content` into chunks.
    ///
    /// Lines end at `\n` (a preceding `\r` is dropped). A final line without
    /// a terminator still counts; a final terminator does not open a new
    /// empty line. Empty content yields no chunks.
    pub fn chunk(&self, content: &str) -> Vec<Chunk> {
        let lines: Vec<&str> = content.lines().collect();

        lines
            .chunks(self.chunk_size)
            .enumerate()
            .map(|(index, group)| {
                Chunk::new(
                    index,
                    group.iter().map(|line| line.to_string()).collect(),
                    index * self.chunk_size,
                )
            })
            .collect()
    }
}

/// Split `content` into chunks of at most `chunk_size` lines
pub fn chunk_lines(content: &str, chunk_size: usize) -> Result<Vec<Chunk>> {
    Ok(LineChunker::new(chunk_size)?.chunk(content))
}
