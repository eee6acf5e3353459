use crate::error::Result;

/// A classifier's top prediction in its own label vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentiment {
    /// Native label, e.g. `"positive"` or `"LABEL_2"`.
    pub label: String,
    /// Probability of `label`; nominally in [0, 1].
    pub score: f32,
}

pub trait SentimentAnalysisModel: Send + Sync {
    /// Predict the most likely label for `text` along with its score.
    fn predict_with_score(&self, text: &str) -> Result<RawSentiment>;
}
