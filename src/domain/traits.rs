// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, not
// against the Burn model or the filesystem loader directly.
//
//   - ReviewLoader implements ReviewSource
//   - Classifier   implements SentimentScorer
//   - Vocabulary   implements Persistable

use anyhow::Result;
use crate::domain::review::Review;

// ─── ReviewSource ─────────────────────────────────────────────────────────────
/// Any component that can provide labelled reviews for training.
pub trait ReviewSource {
    fn load_all(&self) -> Result<Vec<Review>>;
}

// ─── SentimentScorer ──────────────────────────────────────────────────────────
/// Any component that turns padded token sequences into the
/// probability that each review is positive.
///
/// All sequences in one call have the same length. The result
/// has exactly one score per input sequence, in order.
pub trait SentimentScorer: Send + Sync {
    fn score_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<f32>>;

    /// Convenience wrapper for a single sequence.
    fn score(&self, sequence: &[u32]) -> Result<f32> {
        let scores = self.score_batch(&[sequence.to_vec()])?;
        scores
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("scorer returned no prediction"))
    }
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
pub trait Persistable: Sized {
    fn save(&self, path: &str) -> Result<()>;

    fn load(path: &str) -> Result<Self>;
}
