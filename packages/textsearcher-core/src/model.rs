//! Position and match index types
//!
//! Coordinates are 0-based. Columns count characters, not bytes, so a
//! position reads the same regardless of how the line is encoded.

use crate::dictionary::Dictionary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Single location of a match in the original, unchunked document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub line_number: usize,
    pub column_number: usize,
}

impl TextPosition {
    pub fn new(line_number: usize, column_number: usize) -> Self {
        Self {
            line_number,
            column_number,
        }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[lineOffset={}, charOffset={}]",
            self.line_number, self.column_number
        )
    }
}

/// One occurrence produced by a scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub name: String,
    pub position: TextPosition,
}

impl MatchEntry {
    pub fn new(name: impl Into<String>, position: TextPosition) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Matches found in one chunk, keyed by name.
///
/// Each list keeps scan order (line, then column within a line). Whether
/// the coordinates are chunk-local or global depends on whether the index
/// has been through [`crate::rebase`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchIndex {
    entries: BTreeMap<String, Vec<TextPosition>>,
}

impl MatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence of `name` at `position`
    pub fn insert(&mut self, name: &str, position: TextPosition) {
        match self.entries.get_mut(name) {
            Some(positions) => positions.push(position),
            None => {
                self.entries.insert(name.to_string(), vec![position]);
            }
        }
    }

    pub fn positions(&self, name: &str) -> Option<&[TextPosition]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Number of distinct names with at least one match
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of occurrences across all names
    pub fn total_matches(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TextPosition])> {
        self.entries
            .iter()
            .map(|(name, positions)| (name.as_str(), positions.as_slice()))
    }

    /// Flattened view as individual match entries
    pub fn entries(&self) -> impl Iterator<Item = MatchEntry> + '_ {
        self.iter().flat_map(|(name, positions)| {
            positions
                .iter()
                .map(move |position| MatchEntry::new(name, *position))
        })
    }

    /// Apply `f` to every position, keeping names and order
    pub fn map_positions(self, f: impl Fn(TextPosition) -> TextPosition) -> Self {
        let entries = self
            .entries
            .into_iter()
            .map(|(name, positions)| (name, positions.into_iter().map(&f).collect()))
            .collect();
        Self { entries }
    }
}

impl IntoIterator for MatchIndex {
    type Item = (String, Vec<TextPosition>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<TextPosition>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<MatchEntry> for MatchIndex {
    fn from_iter<I: IntoIterator<Item = MatchEntry>>(iter: I) -> Self {
        let mut index = MatchIndex::new();
        for entry in iter {
            index.insert(&entry.name, entry.position);
        }
        index
    }
}

/// Terminal output of a pipeline run: every name mapped to all of its
/// document-global positions.
///
/// The index is a pass-through union of chunk results. Restricting it to
/// dictionary names is left to consumers via [`AggregatedIndex::retain_dictionary`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedIndex {
    entries: BTreeMap<String, Vec<TextPosition>>,
}

impl AggregatedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every list of `chunk` to the matching list here.
    ///
    /// Existing positions are never overwritten.
    pub fn append(&mut self, chunk: MatchIndex) {
        for (name, mut positions) in chunk {
            self.entries.entry(name).or_default().append(&mut positions);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[TextPosition]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TextPosition])> {
        self.entries
            .iter()
            .map(|(name, positions)| (name.as_str(), positions.as_slice()))
    }

    /// Drop every name that is not in `dictionary`
    pub fn retain_dictionary(&mut self, dictionary: &Dictionary) {
        self.entries.retain(|name, _| dictionary.contains(name));
    }

    /// Copy restricted to names in `dictionary`
    pub fn filtered(&self, dictionary: &Dictionary) -> Self {
        let mut copy = self.clone();
        copy.retain_dictionary(dictionary);
        copy
    }

    /// True when every list is ordered by (line, column)
    pub fn is_document_ordered(&self) -> bool {
        self.entries
            .values()
            .all(|positions| positions.windows(2).all(|pair| pair[0] <= pair[1]))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<TextPosition>> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_position_display() {
        let position = TextPosition::new(1, 10);
        assert_eq!(position.to_string(), "[lineOffset=1, charOffset=10]");
    }

    #[test]
    fn test_text_position_ordering() {
        let mut positions = vec![
            TextPosition::new(2, 0),
            TextPosition::new(0, 7),
            TextPosition::new(0, 3),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                TextPosition::new(0, 3),
                TextPosition::new(0, 7),
                TextPosition::new(2, 0)
            ]
        );
    }

    #[test]
    fn test_match_index_keeps_insertion_order() {
        let mut index = MatchIndex::new();
        index.insert("John", TextPosition::new(0, 9));
        index.insert("John", TextPosition::new(0, 2));
        index.insert("Mark", TextPosition::new(1, 0));

        assert_eq!(index.len(), 2);
        assert_eq!(index.total_matches(), 3);
        assert_eq!(
            index.positions("John").unwrap(),
            &[TextPosition::new(0, 9), TextPosition::new(0, 2)]
        );
        assert_eq!(index.entries().count(), 3);
    }

    #[test]
    fn test_aggregated_append_never_overwrites() {
        let mut first = MatchIndex::new();
        first.insert("John", TextPosition::new(0, 0));
        let mut second = MatchIndex::new();
        second.insert("John", TextPosition::new(5, 1));
        second.insert("Paul", TextPosition::new(6, 2));

        let mut aggregated = AggregatedIndex::new();
        aggregated.append(first);
        aggregated.append(second);

        assert_eq!(
            aggregated.get("John").unwrap(),
            &[TextPosition::new(0, 0), TextPosition::new(5, 1)]
        );
        assert_eq!(aggregated.total_matches(), 3);
        assert!(aggregated.is_document_ordered());
    }

    #[test]
    fn test_retain_dictionary() {
        let mut index = MatchIndex::new();
        index.insert("John", TextPosition::new(0, 0));
        index.insert("word", TextPosition::new(0, 5));
        let mut aggregated = AggregatedIndex::new();
        aggregated.append(index);

        let dictionary = Dictionary::new(["John"]).unwrap();
        let filtered = aggregated.filtered(&dictionary);
        assert!(filtered.contains("John"));
        assert!(!filtered.contains("word"));
        assert_eq!(aggregated.len(), 2);
    }

    #[test]
    fn test_aggregated_serializes_as_map() {
        let mut index = MatchIndex::new();
        index.insert("John", TextPosition::new(1, 10));
        let mut aggregated = AggregatedIndex::new();
        aggregated.append(index);

        let json = serde_json::to_string(&aggregated).unwrap();
        assert_eq!(json, r#"{"John":[{"line_number":1,"column_number":10}]}"#);
    }
}
