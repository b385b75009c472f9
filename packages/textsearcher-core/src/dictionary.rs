//! Target name dictionary
//!
//! Built once at process start and shared read-only (behind an `Arc`) by
//! every scan task, so it needs no locking.

use crate::error::{CoreError, Result};
use std::collections::BTreeSet;

/// Reference dictionary: 50 common English first names
pub const PERSON_NAMES: [&str; 50] = [
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Charles", "Joseph",
    "Thomas", "Christopher", "Daniel", "Paul", "Mark", "Donald", "George", "Kenneth", "Steven",
    "Edward", "Brian", "Ronald", "Anthony", "Kevin", "Jason", "Matthew", "Gary", "Timothy", "Jose",
    "Larry", "Jeffrey", "Frank", "Scott", "Eric", "Stephen", "Andrew", "Raymond", "Gregory",
    "Joshua", "Jerry", "Dennis", "Walter", "Patrick", "Peter", "Harold", "Douglas", "Henry",
    "Carl", "Arthur", "Ryan", "Roger",
];

/// Immutable, deduplicated set of names to search for.
///
/// Iteration order is lexicographic, which keeps scan order deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    names: BTreeSet<String>,
}

impl Dictionary {
    /// Build a dictionary from names. Duplicates collapse; empty names are rejected.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for (position, name) in names.into_iter().enumerate() {
            let name = name.into();
            if name.is_empty() {
                return Err(CoreError::EmptyDictionaryEntry { position });
            }
            set.insert(name);
        }
        Ok(Self { names: set })
    }

    /// The built-in [`PERSON_NAMES`] dictionary
    pub fn person_names() -> Self {
        Self {
            names: PERSON_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Parse a dictionary file: one name per line, surrounding whitespace
    /// trimmed, blank lines and `#` comments skipped.
    pub fn from_lines(text: &str) -> Result<Self> {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Self::new(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::person_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_names_dictionary() {
        let dictionary = Dictionary::person_names();
        assert_eq!(dictionary.len(), 50);
        assert!(dictionary.contains("John"));
        assert!(dictionary.contains("Roger"));
        assert!(!dictionary.contains("john"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let dictionary = Dictionary::new(["John", "Mark", "John"]).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.iter().collect::<Vec<_>>(), vec!["John", "Mark"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Dictionary::new(["John", ""]);
        assert_eq!(result, Err(CoreError::EmptyDictionaryEntry { position: 1 }));
    }

    #[test]
    fn test_from_lines_skips_comments_and_blanks() {
        let text = "# names\nJohn\n\n  Mary  \n# trailing\n";
        let dictionary = Dictionary::from_lines(text).unwrap();
        assert_eq!(dictionary.iter().collect::<Vec<_>>(), vec!["John", "Mary"]);
    }
}
