use crate::config::WordLength;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Built-in target words, one per line, lengths 4 to 6.
pub const EMBEDDED_WORDBANK: &str = include_str!("resources/words.txt");

/// Words grouped by length, deduplicated and kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPools {
    by_length: BTreeMap<WordLength, BTreeSet<String>>,
}

impl WordPools {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word if it has a supported length and only ASCII letters.
    /// Returns whether it was accepted.
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return false;
        }
        let Some(length) = WordLength::from_letters(word.len()) else {
            return false;
        };
        self.by_length.entry(length).or_default().insert(word);
        true
    }

    pub fn extend(&mut self, other: &WordPools) {
        for (length, words) in &other.by_length {
            self.by_length
                .entry(*length)
                .or_default()
                .extend(words.iter().cloned());
        }
    }

    #[must_use]
    pub fn pool(&self, length: WordLength) -> Vec<&str> {
        self.by_length
            .get(&length)
            .map(|words| words.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        WordLength::from_letters(word.len())
            .and_then(|length| self.by_length.get(&length))
            .is_some_and(|words| words.contains(&word))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_length.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn load_wordbank_from_str(data: &str) -> WordPools {
    let mut pools = WordPools::new();
    for line in data.lines() {
        pools.insert(line);
    }
    pools
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> io::Result<WordPools> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut pools = WordPools::new();
    for line in reader.lines() {
        pools.insert(&line?);
    }
    Ok(pools)
}
