// ============================================================
// Layer 2 — Analyze Use Case
// ============================================================
// One "Classify" click, end to end:
//
//   1. Preprocess the review at the chosen maxlen
//   2. Score it; a failed prediction is reported and scored 0.0
//   3. Apply the decision threshold
//   4. Decode the padded ids back to text for inspection
//   5. Leave-one-out importance for the first 60 words
//   6. Assemble the downloadable report
//
// Nothing here knows about Burn, the terminal, or HTTP.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::data::preprocessor::{
    decoded_preview, pad_sequence, tokenize, Preprocessor, MAXLEN_DEFAULT,
};
use crate::domain::report::{
    ImportanceRow, Report, Sentiment, TextDiagnostics, TokenImportance, TOP_IMPORTANCES,
};
use crate::domain::traits::SentimentScorer;
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::{backend::ComputeBackend, inferencer::load_scorer};

pub const MAXLEN_MIN: usize = 100;
pub const MAXLEN_MAX: usize = 1000;
pub const THRESHOLD_DEFAULT: f64 = 0.5;

/// Words considered by the leave-one-out pass.
pub const IMPORTANCE_WORD_LIMIT: usize = 60;

/// Sequences scored per forward pass during leave-one-out.
const IMPORTANCE_CHUNK: usize = 32;

/// The two user controls: sequence length and decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub maxlen:    usize,
    pub threshold: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { maxlen: MAXLEN_DEFAULT, threshold: THRESHOLD_DEFAULT }
    }
}

impl AnalysisSettings {
    pub fn new(maxlen: usize, threshold: f64) -> Result<Self> {
        if !(MAXLEN_MIN..=MAXLEN_MAX).contains(&maxlen) {
            bail!("maxlen must be between {MAXLEN_MIN} and {MAXLEN_MAX}, got {maxlen}");
        }
        if !(0.0..=1.0).contains(&threshold) {
            bail!("threshold must be between 0 and 1, got {threshold}");
        }
        Ok(Self { maxlen, threshold })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities {
    pub positive: f64,
    pub negative: f64,
}

/// Everything shown after a classification.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub sentiment:     Sentiment,
    pub prediction:    f64,
    pub probabilities: Probabilities,
    /// Decoded padded input, cut to the preview length
    pub decoded:       String,
    /// Top leave-one-out rows, largest |delta| first
    pub importances:   Vec<ImportanceRow>,
    pub diagnostics:   TextDiagnostics,
    pub report:        Report,
    /// Failures surfaced to the user instead of aborting
    pub errors:        Vec<String>,
    pub elapsed_ms:    u64,
}

/// The downloadable summary of one classification.
pub fn build_report(
    text:        &str,
    prediction:  f64,
    sentiment:   Sentiment,
    importances: &[ImportanceRow],
    settings:    AnalysisSettings,
) -> Report {
    Report {
        input:                 text.to_string(),
        prediction,
        sentiment,
        top_token_importances: importances.to_vec(),
        maxlen_used:           settings.maxlen,
        threshold:             settings.threshold,
    }
}

pub struct AnalyzeUseCase {
    preprocessor: Preprocessor,
    scorer:       Arc<dyn SentimentScorer>,
}

impl AnalyzeUseCase {
    pub fn new(preprocessor: Preprocessor, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { preprocessor, scorer }
    }

    /// Load weights and vocabulary from a training artifact directory.
    pub fn from_artifacts(
        artifact_dir: &str,
        word_index:   Option<&str>,
        backend:      ComputeBackend,
    ) -> Result<Self> {
        let ckpt = CheckpointManager::new(artifact_dir);
        let (scorer, vocab_size) = load_scorer(&ckpt, backend)?;
        let vocab = VocabStore::new(artifact_dir).load(word_index, None)?;
        let preprocessor = Preprocessor::new(Arc::new(vocab), Some(vocab_size));
        Ok(Self::new(preprocessor, scorer))
    }

    pub fn classify(&self, text: &str, settings: AnalysisSettings) -> Analysis {
        let started = Instant::now();
        let mut errors = Vec::new();

        let padded = self.preprocessor.preprocess(text, settings.maxlen);
        let prediction = match self.scorer.score(&padded) {
            Ok(p) => f64::from(p),
            Err(e) => {
                tracing::warn!("Prediction failed: {e:#}");
                errors.push(format!("Prediction error: {e:#}"));
                0.0
            }
        };
        let sentiment = Sentiment::from_score(prediction, settings.threshold);

        let decoded = decoded_preview(&self.preprocessor.decode(&padded));

        let importances: Vec<ImportanceRow> =
            match self.word_importance(text, settings.maxlen, IMPORTANCE_WORD_LIMIT) {
                Ok(Some((_, all))) => all.iter().take(TOP_IMPORTANCES).map(ImportanceRow::from).collect(),
                Ok(None) => Vec::new(),
                Err(e) => {
                    tracing::warn!("Token importance failed: {e:#}");
                    errors.push(format!("Token importance error: {e:#}"));
                    Vec::new()
                }
            };

        let report = build_report(text, prediction, sentiment, &importances, settings);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "Classified {} words as {} ({:.4}) in {} ms",
            text.split_whitespace().count(), sentiment, prediction, elapsed_ms
        );

        Analysis {
            sentiment,
            prediction,
            probabilities: Probabilities { positive: prediction, negative: 1.0 - prediction },
            decoded,
            importances,
            diagnostics: TextDiagnostics::from_text(text),
            report,
            errors,
            elapsed_ms,
        }
    }

    /// Leave-one-out importance over the first `limit_words` words.
    ///
    /// Returns the base score of those words and one entry per word,
    /// sorted by |delta| descending (ties keep word order).
    /// Returns `None` when the text has no words.
    pub fn word_importance(
        &self,
        text:        &str,
        maxlen:      usize,
        limit_words: usize,
    ) -> Result<Option<(f64, Vec<TokenImportance>)>> {
        let mut words = tokenize(text);
        if words.is_empty() {
            return Ok(None);
        }
        words.truncate(limit_words);

        let ids = self.preprocessor.encode_words(&words);

        // Row 0 is the base input, row i + 1 is the input without word i
        let mut variants = Vec::with_capacity(words.len() + 1);
        variants.push(pad_sequence(&ids, maxlen));
        for i in 0..ids.len() {
            let mut without = ids.clone();
            without.remove(i);
            variants.push(pad_sequence(&without, maxlen));
        }

        let mut scores = Vec::with_capacity(variants.len());
        for chunk in variants.chunks(IMPORTANCE_CHUNK) {
            scores.extend(self.scorer.score_batch(chunk)?);
        }
        if scores.len() != variants.len() {
            bail!("expected {} scores, model returned {}", variants.len(), scores.len());
        }

        let base = f64::from(scores[0]);
        let mut importances: Vec<TokenImportance> = words
            .into_iter()
            .zip(&scores[1..])
            .map(|(word, &without)| TokenImportance { word, delta: base - f64::from(without) })
            .collect();
        importances.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));

        Ok(Some((base, importances)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocabulary::Vocabulary;
    use std::collections::HashMap;

    // ids: good=4, bad=5, movie=6, the=7
    const GOOD: u32 = 4;
    const BAD: u32 = 5;

    /// 0.5 + 0.25 per "good" − 0.125 per "bad", clamped to [0, 1].
    struct CountingScorer;

    impl SentimentScorer for CountingScorer {
        fn score_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<f32>> {
            Ok(sequences
                .iter()
                .map(|s| {
                    let good = s.iter().filter(|&&id| id == GOOD).count() as f32;
                    let bad  = s.iter().filter(|&&id| id == BAD).count() as f32;
                    (0.5 + 0.25 * good - 0.125 * bad).clamp(0.0, 1.0)
                })
                .collect())
        }
    }

    struct FailingScorer;

    impl SentimentScorer for FailingScorer {
        fn score_batch(&self, _sequences: &[Vec<u32>]) -> Result<Vec<f32>> {
            bail!("device lost")
        }
    }

    fn use_case(scorer: Arc<dyn SentimentScorer>) -> AnalyzeUseCase {
        let index: HashMap<String, u32> = [("good", 1), ("bad", 2), ("movie", 3), ("the", 4)]
            .iter()
            .map(|(w, r)| (w.to_string(), *r))
            .collect();
        let vocab = Vocabulary::from_word_index(index, None);
        AnalyzeUseCase::new(Preprocessor::new(Arc::new(vocab), Some(10_000)), scorer)
    }

    fn settings(maxlen: usize) -> AnalysisSettings {
        AnalysisSettings { maxlen, threshold: 0.5 }
    }

    #[test]
    fn test_settings_bounds() {
        assert!(AnalysisSettings::new(100, 0.0).is_ok());
        assert!(AnalysisSettings::new(1000, 1.0).is_ok());
        assert!(AnalysisSettings::new(99, 0.5).is_err());
        assert!(AnalysisSettings::new(1001, 0.5).is_err());
        assert!(AnalysisSettings::new(500, 1.01).is_err());
        assert!(AnalysisSettings::new(500, f64::NAN).is_err());
        assert_eq!(AnalysisSettings::default(), AnalysisSettings { maxlen: 500, threshold: 0.5 });
    }

    #[test]
    fn test_classify_positive_review() {
        let uc = use_case(Arc::new(CountingScorer));
        let a  = uc.classify("Good movie", settings(500));

        assert_eq!(a.prediction, 0.75);
        assert_eq!(a.sentiment, Sentiment::Positive);
        assert_eq!(a.probabilities.negative, 0.25);
        assert_eq!(a.decoded, "good movie");
        assert!(a.errors.is_empty());
        assert_eq!(a.diagnostics.tokens, vec!["Good", "movie"]);
    }

    #[test]
    fn test_threshold_changes_the_label() {
        let uc = use_case(Arc::new(CountingScorer));
        let a  = uc.classify("good", AnalysisSettings { maxlen: 100, threshold: 0.8 });
        assert_eq!(a.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_long_review_keeps_its_tail() {
        let uc = use_case(Arc::new(CountingScorer));
        // "good" falls off the front at maxlen 3
        let a = uc.classify("good movie movie movie", settings(3));
        assert_eq!(a.prediction, 0.5);
    }

    #[test]
    fn test_leave_one_out_deltas_and_order() {
        let uc = use_case(Arc::new(CountingScorer));
        let (base, imps) = uc
            .word_importance("movie BAD good", 500, IMPORTANCE_WORD_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(base, 0.625);
        let words: Vec<&str> = imps.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["good", "bad", "movie"]);
        assert_eq!(imps[0].delta, 0.25);
        assert_eq!(imps[1].delta, -0.125);
        assert_eq!(imps[2].delta, 0.0);
    }

    /// 0.5 ± 0.125 per "good" / "bad", so both words move the score equally.
    struct BalancedScorer;

    impl SentimentScorer for BalancedScorer {
        fn score_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<f32>> {
            Ok(sequences
                .iter()
                .map(|s| {
                    let good = s.iter().filter(|&&id| id == GOOD).count() as f32;
                    let bad  = s.iter().filter(|&&id| id == BAD).count() as f32;
                    0.5 + 0.125 * good - 0.125 * bad
                })
                .collect())
        }
    }

    #[test]
    fn test_leave_one_out_ties_keep_word_order() {
        let uc = use_case(Arc::new(BalancedScorer));
        let (base, imps) = uc
            .word_importance("bad good movie good bad", 500, IMPORTANCE_WORD_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(base, 0.5);
        let words: Vec<&str> = imps.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["bad", "good", "good", "bad", "movie"]);
        let deltas: Vec<f64> = imps.iter().map(|t| t.delta).collect();
        assert_eq!(deltas, vec![-0.125, 0.125, 0.125, -0.125, 0.0]);
    }

    #[test]
    fn test_leave_one_out_caps_words() {
        let uc   = use_case(Arc::new(CountingScorer));
        let text = vec!["movie"; 75].join(" ");
        let (_, imps) = uc.word_importance(&text, 500, IMPORTANCE_WORD_LIMIT).unwrap().unwrap();
        assert_eq!(imps.len(), IMPORTANCE_WORD_LIMIT);

        let a = uc.classify(&text, settings(500));
        assert_eq!(a.importances.len(), TOP_IMPORTANCES);
        assert_eq!(a.diagnostics.token_count, 75);
    }

    #[test]
    fn test_empty_text() {
        let uc = use_case(Arc::new(CountingScorer));
        assert!(uc.word_importance("   ", 500, IMPORTANCE_WORD_LIMIT).unwrap().is_none());

        let a = uc.classify("", settings(200));
        assert_eq!(a.prediction, 0.5);
        assert!(a.importances.is_empty());
        assert!(a.decoded.is_empty());
        assert!(a.errors.is_empty());
        assert_eq!(a.diagnostics.token_count, 0);
    }

    #[test]
    fn test_failed_prediction_is_reported_not_raised() {
        let uc = use_case(Arc::new(FailingScorer));
        let a  = uc.classify("good movie", settings(500));

        assert_eq!(a.prediction, 0.0);
        assert_eq!(a.sentiment, Sentiment::Negative);
        assert_eq!(a.errors.len(), 2);
        assert!(a.errors[0].contains("device lost"));
        assert!(a.importances.is_empty());
    }

    #[test]
    fn test_report_mirrors_analysis() {
        let uc = use_case(Arc::new(CountingScorer));
        let a  = uc.classify("bad movie", AnalysisSettings { maxlen: 300, threshold: 0.4 });

        assert_eq!(a.report.input, "bad movie");
        assert_eq!(a.report.prediction, 0.375);
        assert_eq!(a.report.sentiment, Sentiment::Negative);
        assert_eq!(a.report.maxlen_used, 300);
        assert_eq!(a.report.threshold, 0.4);
        assert_eq!(a.report.top_token_importances, a.importances);
        assert_eq!(a.report.top_token_importances[0].word, "bad");
        assert_eq!(a.report.top_token_importances[0].effect, "↓");
    }

    #[test]
    fn test_build_report_without_importances() {
        let report = build_report("", 0.5, Sentiment::Negative, &[], settings(100));
        assert_eq!(report.maxlen_used, 100);
        assert!(report.top_token_importances.is_empty());

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"top_token_importances\": []"));
    }
}
