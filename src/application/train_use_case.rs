// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load labelled reviews        (Layer 4 - data)
//   Step 2: Load / build vocabulary      (Layer 6 - infra)
//   Step 3: Encode + pad every review    (Layer 4 - data)
//   Step 4: Split train/validation       (Layer 4 - data)
//   Step 5: Save config                  (Layer 6 - infra)
//   Step 6: Run training loop            (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    dataset::{ReviewDataset, ReviewSample},
    loader::ReviewLoader,
    preprocessor::{Preprocessor, MAXLEN_DEFAULT},
    splitter::split_train_val,
};
use crate::domain::traits::ReviewSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::EpochMetrics, vocab_store::VocabStore};
use crate::ml::{backend::ComputeBackend, model::SentimentRnnConfig, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so it can be saved next to the weights and used to
// rebuild the model for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub artifact_dir:   String,
    pub word_index:     Option<String>,
    pub vocab_limit:    Option<usize>,
    pub vocab_size:     usize,
    pub maxlen:         usize,
    pub embed_dim:      usize,
    pub hidden_dim:     usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub train_fraction: f64,
    pub seed:           u64,
    #[serde(default)]
    pub backend:        ComputeBackend,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/aclImdb/train".to_string(),
            artifact_dir:   "artifacts".to_string(),
            word_index:     None,
            vocab_limit:    None,
            vocab_size:     10_000,
            maxlen:         MAXLEN_DEFAULT,
            embed_dim:      128,
            hidden_dim:     128,
            batch_size:     32,
            epochs:         10,
            lr:             1e-3,
            train_fraction: 0.8,
            seed:           42,
            backend:        ComputeBackend::default(),
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> SentimentRnnConfig {
        SentimentRnnConfig::new(self.vocab_size)
            .with_embed_dim(self.embed_dim)
            .with_hidden_dim(self.hidden_dim)
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;
        if cfg.vocab_size <= 4 {
            bail!("vocab_size must be larger than the 4 reserved ids");
        }
        if !(cfg.train_fraction > 0.0 && cfg.train_fraction < 1.0) {
            bail!("train_fraction must be between 0 and 1 (exclusive), got {}", cfg.train_fraction);
        }

        // ── Step 1: Load reviews ──────────────────────────────────────────────
        tracing::info!("Loading reviews from '{}'", cfg.data_dir);
        let reviews = ReviewLoader::new(&cfg.data_dir).load_all()?;
        if reviews.is_empty() {
            bail!(
                "No reviews found under '{}'. Expected pos/ and neg/ folders of .txt files.",
                cfg.data_dir
            );
        }

        // ── Step 2: Vocabulary ────────────────────────────────────────────────
        let texts: Vec<String> = reviews.iter().map(|r| r.text.clone()).collect();
        let vocab = VocabStore::new(&cfg.artifact_dir).load_or_build(
            &texts,
            cfg.word_index.as_deref(),
            cfg.vocab_limit,
        )?;

        // ── Step 3: Encode and pad ────────────────────────────────────────────
        // Same preprocessing the analyzer applies at inference time
        let preprocessor = Preprocessor::new(Arc::new(vocab), Some(cfg.vocab_size));
        let samples: Vec<ReviewSample> = reviews
            .iter()
            .map(|r| ReviewSample {
                token_ids: preprocessor.preprocess(&r.text, cfg.maxlen),
                label:     r.label,
            })
            .collect();
        tracing::info!("Encoded {} reviews to length {}", samples.len(), cfg.maxlen);

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        // Best-epoch selection needs a validation loss every epoch
        if train_samples.is_empty() || val_samples.is_empty() {
            bail!(
                "Split of {} reviews at train_fraction={} leaves {} train / {} validation; both must be non-empty",
                train_samples.len() + val_samples.len(),
                cfg.train_fraction,
                train_samples.len(),
                val_samples.len()
            );
        }
        let train_dataset = ReviewDataset::new(train_samples);
        let val_dataset   = ReviewDataset::new(val_samples);
        tracing::info!(
            "Split: {} train ({} positive), {} validation",
            train_dataset.sample_count(),
            train_dataset.positive_count(),
            val_dataset.sample_count()
        );

        // ── Step 5: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.artifact_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, &ckpt_manager)
    }
}
