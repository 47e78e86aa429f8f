// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// A word → rank mapping in the Keras IMDB word-index format:
//
//   { "the": 1, "and": 2, "a": 3, ... }
//
// Ranks start at 1 and lower ranks are more frequent words.
// The reverse mapping (rank → word) is kept alongside so that
// encoded sequences can be decoded back into text.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;

use crate::domain::traits::Persistable;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    reverse:    HashMap<u32, String>,
}

impl Vocabulary {
    /// Build from an existing word index, optionally keeping only
    /// the `limit` most frequent words (rank <= limit).
    pub fn from_word_index(word_index: HashMap<String, u32>, limit: Option<usize>) -> Self {
        let word_index: HashMap<String, u32> = match limit {
            Some(limit) => word_index
                .into_iter()
                .filter(|(_, rank)| (*rank as usize) <= limit)
                .collect(),
            None => word_index,
        };
        let reverse = word_index
            .iter()
            .map(|(word, rank)| (*rank, word.clone()))
            .collect();
        Self { word_index, reverse }
    }

    /// Rank words of a corpus by frequency. Ties are broken
    /// alphabetically so the same corpus always yields the same ranks.
    ///
    /// Words are produced exactly as the inference preprocessor
    /// produces them: lowercase, split on whitespace.
    pub fn build<'a>(texts: impl IntoIterator<Item = &'a str>, limit: Option<usize>) -> Self {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in super::preprocessor::tokenize(text) {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(limit) = limit {
            words.truncate(limit);
        }

        let word_index = words
            .into_iter()
            .enumerate()
            .map(|(i, (word, _))| (word, i as u32 + 1))
            .collect();
        Self::from_word_index(word_index, None)
    }

    /// Keep only words with rank <= limit.
    pub fn truncated(self, limit: usize) -> Self {
        Self::from_word_index(self.word_index, Some(limit))
    }

    pub fn rank(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }

    pub fn word(&self, rank: u32) -> Option<&str> {
        self.reverse.get(&rank).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }
}

impl Persistable for Vocabulary {
    fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string(&self.word_index)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write word index to '{path}'"))?;
        tracing::debug!("Saved {} words to '{}'", self.len(), path);
        Ok(())
    }

    fn load(path: &str) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read word index from '{path}'"))?;
        let word_index: HashMap<String, u32> = serde_json::from_str(&json)
            .with_context(|| format!("'{path}' is not a word → rank JSON object"))?;
        Ok(Self::from_word_index(word_index, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(w, r)| (w.to_string(), *r)).collect()
    }

    #[test]
    fn test_limit_keeps_most_frequent() {
        let v = Vocabulary::from_word_index(index(&[("the", 1), ("and", 2), ("film", 3)]), Some(2));
        assert_eq!(v.len(), 2);
        assert_eq!(v.rank("and"), Some(2));
        assert_eq!(v.rank("film"), None);
        assert_eq!(v.word(1), Some("the"));
    }

    #[test]
    fn test_build_ranks_by_frequency_then_alphabet() {
        let v = Vocabulary::build(["b a a", "c b A"], None);
        // a:3, b:2, c:1
        assert_eq!(v.rank("a"), Some(1));
        assert_eq!(v.rank("b"), Some(2));
        assert_eq!(v.rank("c"), Some(3));

        let tie = Vocabulary::build(["y x"], None);
        assert_eq!(tie.rank("x"), Some(1));
        assert_eq!(tie.rank("y"), Some(2));
    }

    #[test]
    fn test_save_and_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("word_index.json");
        let path = path.to_str().unwrap();

        let v = Vocabulary::from_word_index(index(&[("great", 7), ("movie", 3)]), None);
        v.save(path).unwrap();
        let loaded = Vocabulary::load(path).unwrap();
        assert_eq!(loaded.rank("great"), Some(7));
        assert_eq!(loaded.word(3), Some("movie"));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(Vocabulary::load(path.to_str().unwrap()).is_err());
    }
}
