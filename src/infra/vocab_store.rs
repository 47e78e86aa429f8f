// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Keeps the vocabulary used for training and inference in sync.
//
// Resolution order when a vocabulary is needed:
//   1. An explicit word-index JSON (e.g. Keras' imdb_word_index.json)
//   2. The word_index.json stored in the artifact directory
//   3. (training only) build one from the corpus and store it
//
// Whatever is used for training is written to the artifact
// directory, so `classify` and `serve` encode words exactly the
// way the model saw them.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::data::vocabulary::Vocabulary;
use crate::domain::traits::Persistable;

const FILE_NAME: &str = "word_index.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    fn stored_path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    /// Vocabulary for inference: explicit file, else the stored one.
    pub fn load(&self, word_index: Option<&str>, limit: Option<usize>) -> Result<Vocabulary> {
        let path = match word_index {
            Some(p) => PathBuf::from(p),
            None    => self.stored_path(),
        };
        let path_str = path.to_str()
            .with_context(|| format!("Non UTF-8 path '{}'", path.display()))?;
        let vocab = Vocabulary::load(path_str)?;
        let vocab = match limit {
            Some(limit) => vocab.truncated(limit),
            None        => vocab,
        };
        tracing::info!("Loaded vocabulary of {} words from '{}'", vocab.len(), path.display());
        Ok(vocab)
    }

    /// Vocabulary for training. Builds one from `texts` when neither an
    /// explicit nor a stored word index exists, then stores the result.
    pub fn load_or_build(
        &self,
        texts:      &[String],
        word_index: Option<&str>,
        limit:      Option<usize>,
    ) -> Result<Vocabulary> {
        let vocab = if word_index.is_some() || self.stored_path().exists() {
            self.load(word_index, limit)?
        } else {
            tracing::info!("Building new vocabulary from {} reviews", texts.len());
            Vocabulary::build(texts.iter().map(String::as_str), limit)
        };

        std::fs::create_dir_all(&self.dir).ok();
        let stored = self.stored_path();
        let stored_str = stored.to_str()
            .with_context(|| format!("Non UTF-8 path '{}'", stored.display()))?;
        vocab.save(stored_str)?;
        tracing::info!("Vocabulary of {} words saved to '{}'", vocab.len(), stored.display());
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_then_reuses_stored_vocabulary() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path().to_str().unwrap());

        let texts = vec!["good good film".to_string(), "bad film".to_string()];
        let built = store.load_or_build(&texts, None, None).unwrap();
        assert_eq!(built.rank("film"), Some(1));
        assert!(dir.path().join(FILE_NAME).exists());

        // Second call must not rebuild from the new corpus
        let other = vec!["zebra zebra zebra".to_string()];
        let again = store.load_or_build(&other, None, None).unwrap();
        assert_eq!(again.rank("zebra"), None);
        assert_eq!(again.rank("good"), Some(2));
    }

    #[test]
    fn test_explicit_word_index_with_limit() {
        let dir  = tempfile::tempdir().unwrap();
        let file = dir.path().join("imdb_word_index.json");
        std::fs::write(&file, r#"{"the": 1, "and": 2, "a": 3, "of": 4}"#).unwrap();

        let store = VocabStore::new(dir.path().join("artifacts").to_str().unwrap());
        let vocab = store.load(file.to_str(), Some(2)).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.rank("and"), Some(2));
        assert_eq!(vocab.rank("a"), None);
    }

    #[test]
    fn test_missing_vocabulary_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path().to_str().unwrap());
        assert!(store.load(None, None).is_err());
    }
}
