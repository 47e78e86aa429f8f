// ============================================================
// Layer 3 — Analysis Result Types
// ============================================================
// Everything the analyzer hands back to a presentation layer
// (terminal or browser). All types serialise to JSON so the
// web API and the downloadable report share one shape.

use serde::{Deserialize, Serialize};

/// Number of importance rows kept in tables and reports.
pub const TOP_IMPORTANCES: usize = 20;

/// Number of raw tokens listed in the text diagnostics.
pub const DIAGNOSTIC_TOKENS: usize = 60;

/// Binary sentiment decided by comparing the model score to a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Positive only when the score is strictly above the threshold.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave-one-out contribution of a single word.
///
/// `delta = base_score - score_without_word`, so a positive delta
/// means the word pushes the review towards Positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenImportance {
    pub word:  String,
    pub delta: f64,
}

/// One display/report row derived from a `TokenImportance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceRow {
    pub word: String,

    /// Delta rounded to 4 decimal places
    #[serde(rename = "delta (base - without_word)")]
    pub delta: f64,

    /// "↑" when the word raises the score, "↓" otherwise
    pub effect: String,
}

impl From<&TokenImportance> for ImportanceRow {
    fn from(t: &TokenImportance) -> Self {
        let effect = if t.delta > 0.0 { "↑" } else { "↓" };
        Self {
            word:   t.word.clone(),
            delta:  round4(t.delta),
            effect: effect.to_string(),
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Word count and leading tokens of the raw, un-lowercased input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDiagnostics {
    pub token_count: usize,
    pub tokens:      Vec<String>,
}

impl TextDiagnostics {
    pub fn from_text(text: &str) -> Self {
        let all: Vec<&str> = text.split_whitespace().collect();
        Self {
            token_count: all.len(),
            tokens: all
                .iter()
                .take(DIAGNOSTIC_TOKENS)
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// The downloadable JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub input:                 String,
    pub prediction:            f64,
    pub sentiment:             Sentiment,
    pub top_token_importances: Vec<ImportanceRow>,
    pub maxlen_used:           usize,
    pub threshold:             f64,
}

impl Report {
    /// Suggested file name for downloads.
    pub const FILE_NAME: &'static str = "sentiment_report.json";

    /// Pretty JSON with 2-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_threshold_is_strict() {
        assert_eq!(Sentiment::from_score(0.51, 0.5), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(0.5, 0.5), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(0.0, 0.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(1.0, 1.0), Sentiment::Negative);
    }

    #[test]
    fn test_row_rounds_and_marks_effect() {
        let up = ImportanceRow::from(&TokenImportance { word: "great".into(), delta: 0.123456 });
        assert_eq!(up.delta, 0.1235);
        assert_eq!(up.effect, "↑");

        let down = ImportanceRow::from(&TokenImportance { word: "boring".into(), delta: -0.2 });
        assert_eq!(down.effect, "↓");

        // zero contribution counts as "down"
        let flat = ImportanceRow::from(&TokenImportance { word: "the".into(), delta: 0.0 });
        assert_eq!(flat.effect, "↓");
    }

    #[test]
    fn test_diagnostics_keep_case_and_cap_tokens() {
        let text = (0..70).map(|i| format!("W{i}")).collect::<Vec<_>>().join(" ");
        let d = TextDiagnostics::from_text(&text);
        assert_eq!(d.token_count, 70);
        assert_eq!(d.tokens.len(), DIAGNOSTIC_TOKENS);
        assert_eq!(d.tokens[0], "W0");
    }

    #[test]
    fn test_report_json_keys() {
        let report = Report {
            input:      "good film".into(),
            prediction: 0.9,
            sentiment:  Sentiment::Positive,
            top_token_importances: vec![ImportanceRow::from(&TokenImportance {
                word: "good".into(),
                delta: 0.4,
            })],
            maxlen_used: 500,
            threshold:   0.5,
        };
        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sentiment"], "Positive");
        assert_eq!(value["maxlen_used"], 500);
        assert_eq!(value["top_token_importances"][0]["delta (base - without_word)"], 0.4);
        assert_eq!(value["top_token_importances"][0]["effect"], "↑");
        // two-space indentation
        assert!(json.contains("\n  \"input\""));
    }
}
