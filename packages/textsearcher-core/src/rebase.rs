//! Chunk-local → document-global coordinates
//!
//! Addressing is line-based end to end: a global position is the chunk's
//! `start_line_offset` plus the local line, with the column untouched.
//! Lines are never joined per chunk, so no cumulative character offset is
//! needed.

use crate::chunker::Chunk;
use crate::model::{MatchIndex, TextPosition};

/// Shift one chunk-local position by the chunk's starting line
pub fn rebase_position(local: TextPosition, start_line_offset: usize) -> TextPosition {
    TextPosition::new(start_line_offset + local.line_number, local.column_number)
}

/// Convert a chunk-local index into document-global coordinates.
///
/// Consumes the local index; `chunk` is only read.
pub fn rebase(local: MatchIndex, chunk: &Chunk) -> MatchIndex {
    let offset = chunk.start_line_offset;
    debug_assert!(
        local
            .iter()
            .flat_map(|(_, positions)| positions)
            .all(|p| p.line_number < chunk.line_count()),
        "local line outside chunk {}",
        chunk.index
    );
    local.map_positions(|position| rebase_position(position, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_shifts_lines_only() {
        let chunk = Chunk::new(3, vec!["x".into(), "John".into()], 30);
        let mut local = MatchIndex::new();
        local.insert("John", TextPosition::new(1, 0));

        let global = rebase(local, &chunk);
        assert_eq!(global.positions("John").unwrap(), &[TextPosition::new(31, 0)]);
        assert_eq!(chunk.start_line_offset, 30);
    }

    #[test]
    fn test_first_chunk_is_identity() {
        let chunk = Chunk::new(0, vec!["a John".into()], 0);
        let mut local = MatchIndex::new();
        local.insert("John", TextPosition::new(0, 2));

        let global = rebase(local.clone(), &chunk);
        assert_eq!(global, local);
    }
}
