// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific model code lives here.
//
//   model.rs      — Embedding → simple ReLU RNN → Dense(1)
//                   binary sentiment classifier
//
//   trainer.rs    — training loop: forward pass, BCE loss,
//                   backward pass, Adam step, validation,
//                   checkpoint and metrics per epoch
//
//   inferencer.rs — loads a checkpoint and scores batches of
//                   padded token sequences
//
//   backend.rs    — GPU (wgpu) or CPU (ndarray) selection
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Elman (1990) Finding Structure in Time

/// GPU / CPU backend selection
pub mod backend;

/// Recurrent sentiment model architecture
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference engine: loads a checkpoint and scores sequences
pub mod inferencer;
