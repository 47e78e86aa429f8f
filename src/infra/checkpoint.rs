// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What lives in the artifact directory:
//
//   artifacts/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz   ← weights after epoch 2
//     ...
//     latest_epoch.json      ← number of the last saved epoch
//     best_epoch.json        ← epoch with the lowest validation loss
//     train_config.json      ← hyper-parameters, needed to rebuild
//                              the model before loading weights
//     word_index.json        ← vocabulary (see VocabStore)
//     metrics.csv            ← per-epoch metrics (see MetricsLogger)
//
// Loading prefers the best epoch and falls back to the latest.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::SentimentRnn;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: Backend>(
        &self,
        model: &SentimentRnn<B>,
        epoch: usize,
    ) -> Result<()> {
        // The recorder appends its own extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        self.write_pointer("latest_epoch.json", epoch)?;
        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Record `epoch` as the best one seen so far.
    pub fn mark_best(&self, epoch: usize) -> Result<()> {
        self.write_pointer("best_epoch.json", epoch)
    }

    /// Load weights from the best epoch, or the latest if no best
    /// epoch was recorded.
    ///
    /// The model must already have the checkpoint's architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  SentimentRnn<B>,
        device: &B::Device,
    ) -> Result<SentimentRnn<B>> {
        let epoch = self.checkpoint_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// Must be written before training starts so the inferencer
    /// can rebuild the exact model architecture. A new config starts
    /// a new run, so epoch pointers from an earlier run are removed.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.clear_pointers()?;

        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }

    fn checkpoint_epoch(&self) -> Result<usize> {
        match self.read_pointer("best_epoch.json") {
            Ok(epoch) => Ok(epoch),
            Err(_)    => self.read_pointer("latest_epoch.json"),
        }
    }

    // Weights of an earlier run may not fit the new architecture.
    fn clear_pointers(&self) -> Result<()> {
        for name in ["best_epoch.json", "latest_epoch.json"] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Cannot remove stale '{}'", path.display()))?;
                tracing::debug!("Removed stale pointer '{}'", path.display());
            }
        }
        Ok(())
    }

    fn write_pointer(&self, name: &str, epoch: usize) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))
    }

    fn read_pointer(&self, name: &str) -> Result<usize> {
        let path = self.dir.join(name);
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'. Have you run 'train' first?", name))?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::backend::NdArrayBackend;
    use crate::ml::model::SentimentRnnConfig;

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());

        let cfg = TrainConfig { maxlen: 120, hidden_dim: 16, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.maxlen, 120);
        assert_eq!(loaded.hidden_dim, 16);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());
        assert!(ckpt.load_config().is_err());

        let device = Default::default();
        let model  = SentimentRnnConfig::new(10).with_embed_dim(2).with_hidden_dim(2)
            .init::<NdArrayBackend>(&device);
        assert!(ckpt.load_model(model, &device).is_err());
    }

    #[test]
    fn test_best_epoch_wins_over_latest() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());

        let device = Default::default();
        let model  = SentimentRnnConfig::new(10).with_embed_dim(2).with_hidden_dim(2)
            .init::<NdArrayBackend>(&device);
        ckpt.save_model(&model, 1).unwrap();
        ckpt.save_model(&model, 2).unwrap();
        assert_eq!(ckpt.checkpoint_epoch().unwrap(), 2);

        ckpt.mark_best(1).unwrap();
        assert_eq!(ckpt.checkpoint_epoch().unwrap(), 1);
        assert!(ckpt.load_model(model, &device).is_ok());
    }

    #[test]
    fn test_new_config_forgets_previous_run() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());

        let device = Default::default();
        let model  = SentimentRnnConfig::new(10).with_embed_dim(2).with_hidden_dim(2)
            .init::<NdArrayBackend>(&device);
        ckpt.save_config(&TrainConfig { hidden_dim: 2, ..TrainConfig::default() }).unwrap();
        ckpt.save_model(&model, 3).unwrap();
        ckpt.mark_best(3).unwrap();

        ckpt.save_config(&TrainConfig { hidden_dim: 8, ..TrainConfig::default() }).unwrap();
        assert!(!dir.path().join("best_epoch.json").exists());
        assert!(ckpt.checkpoint_epoch().is_err());

        ckpt.save_model(&model, 1).unwrap();
        assert_eq!(ckpt.checkpoint_epoch().unwrap(), 1);
    }
}
