use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// The closed set of sentiments that drive generation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Upbeat, favourable tone.
    Positive,
    /// Critical, unfavourable tone.
    Negative,
    /// Objective, balanced tone.
    Neutral,
}

impl SentimentLabel {
    /// Every label, in display order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Lowercase name (`"positive"`, `"negative"`, `"neutral"`).
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    /// Map a classifier's native label onto the closed set.
    ///
    /// Matching is case-insensitive. Anything other than `positive` or
    /// `negative` (including `LABEL_2`, `mixed`, or an empty string) is
    /// neutral.
    pub fn from_model_label(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user-supplied overrides; unknown names are rejected
/// rather than silently mapped to neutral.
impl std::str::FromStr for SentimentLabel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(PipelineError::Config(format!(
                "unknown sentiment '{other}', expected one of: positive, negative, neutral"
            ))),
        }
    }
}

/// How much to trust a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Above the highest threshold.
    VeryConfident,
    /// Above the middle threshold.
    Confident,
    /// Above the lowest threshold.
    ModeratelyConfident,
    /// At or below the lowest threshold.
    Low,
}

impl ConfidenceTier {
    /// Human-readable name of the tier.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::VeryConfident => "Very confident",
            ConfidenceTier::Confident => "Confident",
            ConfidenceTier::ModeratelyConfident => "Moderately confident",
            ConfidenceTier::Low => "Low confidence",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
