//! Chunk scanners
//!
//! # Matching policies
//!
//! 1. **Substring** (default): exact, case-sensitive, non-overlapping
//!    substring search. `John` also matches inside `Johnson`.
//! 2. **Word**: lines are split into `\w+` runs and a run matches only when
//!    it equals a dictionary entry. `Johnson` does not match `John`.
//!
//! Both emit chunk-local coordinates: line numbers start at 0 within the
//! chunk and columns count characters from the start of the line.

use crate::chunker::Chunk;
use crate::dictionary::Dictionary;
use crate::error::ScanError;
use crate::model::{MatchIndex, TextPosition};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Scans one chunk for dictionary names.
///
/// Implementations must be pure functions of their inputs: the
/// coordinator calls them concurrently from pool threads on disjoint
/// chunks. An `Err` is isolated to the chunk it came from.
pub trait Scanner: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Find every occurrence of every dictionary entry in `chunk`
    fn scan(&self, chunk: &Chunk, dictionary: &Dictionary) -> Result<MatchIndex, ScanError>;
}

/// Matching policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact substring, case-sensitive, non-overlapping
    #[default]
    Substring,
    /// Whole `\w+` tokens equal to a dictionary entry
    Word,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Word => "word",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "word" => Ok(Self::Word),
            _ => Err(format!(
                "Unknown match mode '{}'. Valid modes: substring, word",
                s
            )),
        }
    }

    /// Scanner implementing this policy
    pub fn scanner(&self) -> Arc<dyn Scanner> {
        match self {
            Self::Substring => Arc::new(SubstringScanner),
            Self::Word => Arc::new(WordScanner),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Byte offset → character column within one line
struct ColumnMap {
    /// Byte offset of every char; empty for ASCII lines, where bytes are columns
    char_starts: Vec<usize>,
}

impl ColumnMap {
    fn new(line: &str) -> Self {
        let char_starts = if line.is_ascii() {
            Vec::new()
        } else {
            line.char_indices().map(|(offset, _)| offset).collect()
        };
        Self { char_starts }
    }

    fn column(&self, byte_offset: usize) -> usize {
        if self.char_starts.is_empty() {
            return byte_offset;
        }
        // Match offsets always land on a char boundary
        self.char_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|insert_at| insert_at)
    }
}

/// Exact, case-sensitive, non-overlapping substring scanner.
///
/// After a match at byte `k` the search resumes at `k + name.len()`, so
/// `"JohnJohn"` yields two matches and `"aaa"` searched for `"aa"` yields one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringScanner;

impl SubstringScanner {
    /// Byte offsets of every non-overlapping occurrence of `name` in `line`
    fn occurrences<'a>(line: &'a str, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        let mut from = 0;
        std::iter::from_fn(move || {
            if from > line.len() {
                return None;
            }
            let found = from + line[from..].find(name)?;
            from = found + name.len();
            Some(found)
        })
    }
}

impl Scanner for SubstringScanner {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn scan(&self, chunk: &Chunk, dictionary: &Dictionary) -> Result<MatchIndex, ScanError> {
        let mut index = MatchIndex::new();

        for (line_number, line) in chunk.lines.iter().enumerate() {
            let columns = ColumnMap::new(line);
            for name in dictionary.iter() {
                for byte_offset in Self::occurrences(line, name) {
                    index.insert(
                        name,
                        TextPosition::new(line_number, columns.column(byte_offset)),
                    );
                }
            }
        }

        Ok(index)
    }
}

/// Word-tokenized scanner: a token matches only when it equals an entry
#[derive(Debug, Clone, Copy, Default)]
pub struct WordScanner;

impl Scanner for WordScanner {
    fn name(&self) -> &'static str {
        "word"
    }

    fn scan(&self, chunk: &Chunk, dictionary: &Dictionary) -> Result<MatchIndex, ScanError> {
        let mut index = MatchIndex::new();

        for (line_number, line) in chunk.lines.iter().enumerate() {
            let columns = ColumnMap::new(line);
            for token in WORD_PATTERN.find_iter(line) {
                if dictionary.contains(token.as_str()) {
                    index.insert(
                        token.as_str(),
                        TextPosition::new(line_number, columns.column(token.start())),
                    );
                }
            }
        }

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(lines: &[&str]) -> Chunk {
        Chunk::new(0, lines.iter().map(|l| l.to_string()).collect(), 0)
    }

    fn dictionary(names: &[&str]) -> Dictionary {
        Dictionary::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_substring_finds_all_on_line() {
        let index = SubstringScanner
            .scan(&chunk(&["John met John"]), &dictionary(&["John"]))
            .unwrap();
        assert_eq!(
            index.positions("John").unwrap(),
            &[TextPosition::new(0, 0), TextPosition::new(0, 9)]
        );
    }

    #[test]
    fn test_substring_is_non_overlapping() {
        let index = SubstringScanner
            .scan(&chunk(&["aaaa", "JohnJohn"]), &dictionary(&["aa", "John"]))
            .unwrap();
        assert_eq!(
            index.positions("aa").unwrap(),
            &[TextPosition::new(0, 0), TextPosition::new(0, 2)]
        );
        assert_eq!(index.positions("John").unwrap().len(), 2);
    }

    #[test]
    fn test_substring_matches_inside_longer_token() {
        let index = SubstringScanner
            .scan(&chunk(&["Johnson"]), &dictionary(&["John"]))
            .unwrap();
        assert_eq!(index.positions("John").unwrap(), &[TextPosition::new(0, 0)]);
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let index = SubstringScanner
            .scan(&chunk(&["john JOHN"]), &dictionary(&["John"]))
            .unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_columns_count_characters() {
        let index = SubstringScanner
            .scan(&chunk(&["Zoë and John"]), &dictionary(&["John"]))
            .unwrap();
        assert_eq!(index.positions("John").unwrap(), &[TextPosition::new(0, 8)]);
    }

    #[test]
    fn test_columns_for_many_matches_on_one_line() {
        let line = "é John é John é John";
        let expected = [
            TextPosition::new(0, 2),
            TextPosition::new(0, 9),
            TextPosition::new(0, 16),
        ];

        let substring = SubstringScanner
            .scan(&chunk(&[line]), &dictionary(&["John"]))
            .unwrap();
        assert_eq!(substring.positions("John").unwrap(), &expected);

        let word = WordScanner
            .scan(&chunk(&[line]), &dictionary(&["John"]))
            .unwrap();
        assert_eq!(word.positions("John").unwrap(), &expected);
    }

    #[test]
    fn test_column_map_matches_char_count() {
        let line = "Zoë, Jürgen and Ørjan";
        let columns = ColumnMap::new(line);
        for (offset, _) in line.char_indices() {
            assert_eq!(columns.column(offset), line[..offset].chars().count());
        }
        assert_eq!(columns.column(line.len()), line.chars().count());
    }

    #[test]
    fn test_empty_chunk_yields_empty_index() {
        let index = SubstringScanner
            .scan(&chunk(&[]), &Dictionary::person_names())
            .unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_word_scanner_requires_whole_token() {
        let index = WordScanner
            .scan(
                &chunk(&["Johnson and John", "John's"]),
                &dictionary(&["John"]),
            )
            .unwrap();
        assert_eq!(
            index.positions("John").unwrap(),
            &[TextPosition::new(0, 12), TextPosition::new(1, 0)]
        );
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!(MatchMode::from_str("Word").unwrap(), MatchMode::Word);
        assert_eq!(MatchMode::from_str("substring").unwrap(), MatchMode::Substring);
        assert!(MatchMode::from_str("fuzzy").is_err());
        assert_eq!(MatchMode::default().scanner().name(), "substring");
        assert_eq!(MatchMode::Word.scanner().name(), "word");
    }
}
