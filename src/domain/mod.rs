// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define the core concepts
// of the sentiment analyzer.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Keeping this layer free of the ML framework means the
// analysis workflow can be unit tested with a fake scorer
// and no GPU at all.

// A labelled movie review and the built-in demo reviews
pub mod review;

// Analysis results: sentiment, importances, report
pub mod report;

// Core abstractions (traits) that other layers implement
pub mod traits;
