// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing or HTTP here (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// Classification, token importance and report building
pub mod analyze_use_case;
