// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by both training and inference:
//
//   checkpoint.rs  — model weights (Burn CompactRecorder) plus the
//                    training config needed to rebuild the model
//
//   vocab_store.rs — the word index shared by training and
//                    inference, stored next to the weights
//
//   metrics.rs     — per-epoch training metrics as CSV

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary loading, building and storing
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;
