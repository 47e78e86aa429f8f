// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on Autodiff<B> for gradients
//   - model.valid() returns the model on the inner backend,
//     so the validation loader batches for B::InnerBackend
//   - A logit above 0 is a positive prediction (sigmoid > 0.5)
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::Autodiff,
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::BinaryCrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{ReviewBatch, ReviewBatcher}, dataset::ReviewDataset};
use crate::infra::{checkpoint::CheckpointManager, metrics::{EpochMetrics, MetricsLogger}};
use crate::ml::backend::{ComputeBackend, NdArrayBackend, WgpuBackend};
use crate::ml::model::SentimentRnn;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ReviewDataset,
    val_dataset:   ReviewDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<Vec<EpochMetrics>> {
    match cfg.backend {
        ComputeBackend::Wgpu => {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<Autodiff<WgpuBackend>>(cfg, train_dataset, val_dataset, ckpt_manager, device)
        }
        ComputeBackend::NdArray => {
            tracing::info!("Using CPU (ndarray) backend");
            let device = burn::backend::ndarray::NdArrayDevice::Cpu;
            train_loop::<Autodiff<NdArrayBackend>>(cfg, train_dataset, val_dataset, ckpt_manager, device)
        }
    }
}

pub(crate) fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ReviewDataset,
    val_dataset:   ReviewDataset,
    ckpt_manager:  &CheckpointManager,
    device:        B::Device,
) -> Result<Vec<EpochMetrics>> {

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: SentimentRnn<B> = cfg.model_config().init(&device);
    tracing::info!(
        "Model ready: vocab_size={}, embed_dim={}, hidden_dim={}",
        cfg.vocab_size, cfg.embed_dim, cfg.hidden_dim
    );

    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
    let metrics   = MetricsLogger::new(ckpt_manager.dir().to_string_lossy().to_string())?;

    let train_loader = DataLoaderBuilder::new(ReviewBatcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(ReviewBatcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let batch: ReviewBatch<B> = batch;
            let (loss, _) = model.forward_loss(batch.token_ids, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let batch: ReviewBatch<B::InnerBackend> = batch;
            let logits = model_valid.forward(batch.token_ids);
            let bce = BinaryCrossEntropyLossConfig::new()
                .with_logits(true)
                .init(&logits.device());

            val_loss_sum += bce
                .forward(logits.clone(), batch.labels.clone())
                .into_scalar()
                .elem::<f64>();
            val_batches += 1;

            total_samples += batch.labels.dims()[0];
            let hits: i64 = logits
                .greater_elem(0.0)
                .int()
                .equal(batch.labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
        }

        let avg_val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_acc      = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_acc * 100.0,
        );

        let epoch_metrics = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_acc);
        metrics.log(&epoch_metrics)?;

        ckpt_manager.save_model(&model, epoch)?;
        if epoch_metrics.is_improvement(best_val_loss) {
            best_val_loss = avg_val_loss;
            ckpt_manager.mark_best(epoch)?;
            tracing::info!("Epoch {} is the best so far (val_loss={:.4})", epoch, avg_val_loss);
        }
        history.push(epoch_metrics);
    }

    tracing::info!("Training complete!");
    Ok(history)
}
