// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Turns free review text into the fixed-length integer
// sequence the RNN expects, and back again for display.
//
// Encoding scheme (Keras IMDB convention):
//
//   id 0        → padding
//   id 1        → start-of-sequence marker (unused at inference)
//   id 2        → out-of-vocabulary word
//   id 3        → unused
//   rank r      → id r + 3
//
// Steps applied to a review:
//   1. Lowercase the whole text
//   2. Split on any whitespace (punctuation stays attached)
//   3. Map every word to rank + 3, unknown words to OOV
//   4. Replace ids the model has no embedding for with OOV
//   5. Left-pad with zeros, or keep only the LAST maxlen ids

use std::sync::Arc;

use crate::data::vocabulary::Vocabulary;

pub const PAD_ID: u32 = 0;
pub const START_ID: u32 = 1;
/// Unknown words land here directly. Looking them up with a default
/// rank of 2 and then adding INDEX_FROM would give id 5, which belongs
/// to a real word.
pub const OOV_ID: u32 = 2;
/// Offset between a word's rank and its token id.
pub const INDEX_FROM: u32 = 3;

pub const MAXLEN_DEFAULT: usize = 500;
/// Characters of decoded text shown in the UI.
pub const DECODED_PREVIEW_CHARS: usize = 4000;

/// Lowercase and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Pre-pad with zeros / pre-truncate to exactly `maxlen` ids.
pub fn pad_sequence(ids: &[u32], maxlen: usize) -> Vec<u32> {
    if ids.len() >= maxlen {
        return ids[ids.len() - maxlen..].to_vec();
    }
    let mut padded = vec![PAD_ID; maxlen - ids.len()];
    padded.extend_from_slice(ids);
    padded
}

/// Truncate decoded text to the preview length on a char boundary.
pub fn decoded_preview(decoded: &str) -> String {
    decoded.chars().take(DECODED_PREVIEW_CHARS).collect()
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    vocab: Arc<Vocabulary>,

    /// Size of the model's embedding table; ids at or above it
    /// are mapped to OOV. `None` leaves ids unclamped.
    num_words: Option<usize>,
}

impl Preprocessor {
    pub fn new(vocab: Arc<Vocabulary>, num_words: Option<usize>) -> Self {
        Self { vocab, num_words }
    }

    /// Encode words (already tokenised) into ids without padding.
    pub fn encode_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<u32> {
        words
            .iter()
            .map(|w| self.word_id(w.as_ref()))
            .collect()
    }

    /// Encode raw text into ids without padding.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encode_words(&tokenize(text))
    }

    /// Encode and pad raw text. Empty text becomes all padding.
    pub fn preprocess(&self, text: &str, maxlen: usize) -> Vec<u32> {
        if text.is_empty() {
            return vec![PAD_ID; maxlen];
        }
        pad_sequence(&self.encode(text), maxlen)
    }

    /// Decode ids back into words, skipping the reserved ids.
    /// Ranks missing from the vocabulary print as `?`.
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter(|&&id| id > INDEX_FROM)
            .map(|&id| self.vocab.word(id - INDEX_FROM).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn word_id(&self, word: &str) -> u32 {
        let id = match self.vocab.rank(word) {
            Some(rank) => rank + INDEX_FROM,
            None => return OOV_ID,
        };
        match self.num_words {
            Some(n) if id as usize >= n => OOV_ID,
            _ => id,
        }
    }
}
