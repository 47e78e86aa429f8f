// ============================================================
// Layer 3 — Review Domain Type
// ============================================================

use serde::{Deserialize, Serialize};

/// A movie review loaded from disk, with its sentiment label.
///
/// `label` is 1 for a positive review and 0 for a negative one,
/// matching the sigmoid output the model is trained against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// The file the review was read from, kept for traceability
    pub source: String,

    /// Raw review text
    pub text: String,

    /// 1 = positive, 0 = negative
    pub label: u8,
}

impl Review {
    pub fn new(source: impl Into<String>, text: impl Into<String>, label: u8) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
            label,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Demo reviews offered as quick examples in the UI and the CLI.
pub const SAMPLE_REVIEWS: [&str; 4] = [
    "What a fantastic movie! The story, acting and direction were top notch.",
    "I wasted two hours of my life. The plot was weak and the acting was terrible.",
    "A pleasant surprise — had fun the whole time, would watch again.",
    "Overhyped. It had flashes of good moments but mostly dragged on.",
];

/// Look up a sample review by its 1-based number, as shown on the buttons.
pub fn sample_review(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| SAMPLE_REVIEWS.get(i))
        .copied()
}
