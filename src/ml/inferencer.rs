// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{bail, Result};
use burn::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::traits::SentimentScorer;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{ComputeBackend, NdArrayBackend, WgpuBackend};
use crate::ml::model::SentimentRnn;

/// A loaded sentiment model ready to score token sequences.
///
/// The model sits behind a mutex so one classifier can be shared
/// between request handlers.
pub struct Classifier<B: Backend> {
    pub(crate) model: Mutex<SentimentRnn<B>>,
    vocab_size: usize,
    device:     B::Device,
}

impl<B: Backend> Classifier<B> {
    pub fn new(model: SentimentRnn<B>, device: B::Device) -> Self {
        let vocab_size = model.embedding.weight.val().dims()[0];
        Self { model: Mutex::new(model), vocab_size, device }
    }

    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model: SentimentRnn<B> = cfg.model_config().init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!(
            "Model loaded: vocab_size={}, embed_dim={}, hidden_dim={}",
            cfg.vocab_size, cfg.embed_dim, cfg.hidden_dim
        );
        Ok(Self::new(model, device))
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

impl<B: Backend> SentimentScorer for Classifier<B> {
    fn score_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<f32>> {
        let Some(first) = sequences.first() else {
            return Ok(Vec::new());
        };
        let seq_len = first.len();
        if sequences.iter().any(|s| s.len() != seq_len) {
            bail!("all sequences in a batch must have the same length");
        }
        if let Some(id) = sequences.iter().flatten().find(|&&id| id as usize >= self.vocab_size) {
            bail!("token id {id} is outside the embedding table ({} rows)", self.vocab_size);
        }

        let flat: Vec<i32> = sequences
            .iter()
            .flat_map(|s| s.iter().map(|&x| x as i32))
            .collect();
        let input = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([sequences.len(), seq_len]);

        let probs = self.model.lock().forward_probabilities(input);
        let scores = probs
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read model output: {e:?}"))?;

        tracing::debug!("Scored batch of {} sequences (len {})", sequences.len(), seq_len);
        Ok(scores)
    }
}

/// Load the best (or latest) checkpoint onto the requested backend.
/// Returns the scorer together with the model's embedding size.
pub fn load_scorer(
    ckpt_manager: &CheckpointManager,
    backend:      ComputeBackend,
) -> Result<(Arc<dyn SentimentScorer>, usize)> {
    match backend {
        ComputeBackend::Wgpu => {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            let c = Classifier::<WgpuBackend>::from_checkpoint(ckpt_manager, device)?;
            let vocab_size = c.vocab_size();
            let scorer: Arc<dyn SentimentScorer> = Arc::new(c);
            Ok((scorer, vocab_size))
        }
        ComputeBackend::NdArray => {
            let device = burn::backend::ndarray::NdArrayDevice::Cpu;
            tracing::info!("Using CPU (ndarray) backend");
            let c = Classifier::<NdArrayBackend>::from_checkpoint(ckpt_manager, device)?;
            let vocab_size = c.vocab_size();
            let scorer: Arc<dyn SentimentScorer> = Arc::new(c);
            Ok((scorer, vocab_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SentimentRnnConfig;

    fn classifier() -> Classifier<NdArrayBackend> {
        let device = Default::default();
        let model  = SentimentRnnConfig::new(20)
            .with_embed_dim(4)
            .with_hidden_dim(4)
            .init::<NdArrayBackend>(&device);
        Classifier::new(model, device)
    }

    #[test]
    fn test_one_score_per_sequence() {
        let c = classifier();
        assert_eq!(c.vocab_size(), 20);
        let scores = c.score_batch(&[vec![0, 4, 5], vec![6, 7, 8], vec![0, 0, 0]]).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_batch_and_single_agree() {
        let c = classifier();
        let batch  = c.score_batch(&[vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
        let single = c.score(&[7, 8, 9]).unwrap();
        assert!((batch[1] - single).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_ragged_and_out_of_range() {
        let c = classifier();
        assert!(c.score_batch(&[vec![4, 5], vec![6]]).is_err());
        assert!(c.score_batch(&[vec![4, 25]]).is_err());
        assert!(c.score_batch(&[]).unwrap().is_empty());
    }
}
