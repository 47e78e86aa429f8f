// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw review text and model-ready tensors.
//
//   aclImdb/<split>/{pos,neg}/*.txt
//       │
//       ▼
//   ReviewLoader      → reads files, attaches labels
//       │
//       ▼
//   Vocabulary        → word → rank (Keras word-index format)
//       │
//       ▼
//   Preprocessor      → lowercase, split, encode, pad
//       │
//       ▼
//   ReviewDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   ReviewBatcher     → stacks samples into tensor batches
//
// At inference time only Vocabulary and Preprocessor are used.

/// Loads labelled reviews from an aclImdb-style directory
pub mod loader;

/// Word → rank mapping and its reverse
pub mod vocabulary;

/// Encodes text into fixed-length id sequences and decodes back
pub mod preprocessor;

/// Implements Burn's Dataset trait for encoded reviews
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
