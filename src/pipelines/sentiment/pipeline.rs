use serde::Serialize;
use std::sync::Arc;

use super::label::{ConfidenceTier, SentimentLabel};
use super::model::SentimentAnalysisModel;
use crate::config::{ConfidenceTiers, EmojiMap, WriterConfig};

/// Why a classification fell back to neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The input was empty or whitespace-only.
    EmptyInput,
    /// The classifier backend failed with this message.
    Backend(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::EmptyInput => f.write_str("Empty input"),
            FallbackReason::Backend(message) => f.write_str(message),
        }
    }
}

/// Where a [`SentimentResult`]'s label came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentSource {
    /// The classifier ran.
    Detected,
    /// The caller chose the label.
    Manual,
    /// Classification was skipped or failed.
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Always within [0, 1].
    pub confidence: f32,
    pub interpretation: ConfidenceTier,
    pub emoji: String,
    pub source: SentimentSource,
}

impl SentimentResult {
    /// The fallback message, if classification fell back to neutral.
    pub fn error(&self) -> Option<String> {
        match &self.source {
            SentimentSource::Fallback(reason) => Some(reason.to_string()),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SentimentSource::Fallback(_))
    }
}

/// Detects the sentiment of free text and grades the confidence.
///
/// Classification never fails: blank input and backend errors both come
/// back as neutral with confidence 0.0, tagged with a
/// [`SentimentSource::Fallback`].
pub struct SentimentClassifier<M: SentimentAnalysisModel> {
    model: Arc<M>,
    tiers: ConfidenceTiers,
    emoji: EmojiMap,
}

impl<M: SentimentAnalysisModel> SentimentClassifier<M> {
    pub fn new(model: Arc<M>, config: &WriterConfig) -> Self {
        Self {
            model,
            tiers: config.confidence.clone(),
            emoji: config.emoji.clone(),
        }
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Classify `text`.
    pub fn classify(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return self.fallback(FallbackReason::EmptyInput);
        }

        match self.model.predict_with_score(text) {
            Ok(raw) => {
                let label = SentimentLabel::from_model_label(&raw.label);
                let confidence = clamp_unit(raw.score);
                tracing::debug!(raw_label = %raw.label, %label, confidence, "classified");
                self.result(label, confidence, SentimentSource::Detected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sentiment analysis failed, falling back to neutral");
                self.fallback(FallbackReason::Backend(e.to_string()))
            }
        }
    }

    /// Classify `text` unless the caller already picked a label.
    ///
    /// An override skips the model and reports confidence 1.0.
    pub fn classify_with_override(
        &self,
        text: &str,
        manual: Option<SentimentLabel>,
    ) -> SentimentResult {
        match manual {
            Some(label) => self.result(label, 1.0, SentimentSource::Manual),
            None => self.classify(text),
        }
    }

    pub fn interpret(&self, confidence: f32) -> ConfidenceTier {
        self.tiers.interpret(confidence)
    }

    pub fn emoji(&self, label: SentimentLabel) -> &str {
        self.emoji.get(label)
    }

    fn fallback(&self, reason: FallbackReason) -> SentimentResult {
        if reason == FallbackReason::EmptyInput {
            tracing::warn!("empty input, falling back to neutral");
        }
        self.result(SentimentLabel::Neutral, 0.0, SentimentSource::Fallback(reason))
    }

    fn result(&self, label: SentimentLabel, confidence: f32, source: SentimentSource) -> SentimentResult {
        SentimentResult {
            label,
            confidence,
            interpretation: self.interpret(confidence),
            emoji: self.emoji(label).to_string(),
            source,
        }
    }
}

fn clamp_unit(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, Result};
    use crate::pipelines::sentiment::RawSentiment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        label: &'static str,
        score: f32,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(label: &'static str, score: f32) -> Self {
            Self {
                label,
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SentimentAnalysisModel for Fixed {
        fn predict_with_score(&self, _text: &str) -> Result<RawSentiment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawSentiment {
                label: self.label.to_string(),
                score: self.score,
            })
        }
    }

    struct Broken;

    impl SentimentAnalysisModel for Broken {
        fn predict_with_score(&self, _text: &str) -> Result<RawSentiment> {
            Err(PipelineError::Unexpected("classifier unavailable".into()))
        }
    }

    fn classifier<M: SentimentAnalysisModel>(model: M) -> SentimentClassifier<M> {
        SentimentClassifier::new(Arc::new(model), &WriterConfig::default())
    }

    #[test]
    fn maps_native_labels() {
        let c = classifier(Fixed::new("POSITIVE", 0.93));
        let r = c.classify("I love this");
        assert_eq!(r.label, SentimentLabel::Positive);
        assert_eq!(r.confidence, 0.93);
        assert_eq!(r.interpretation, ConfidenceTier::VeryConfident);
        assert_eq!(r.emoji, "😊");
        assert_eq!(r.source, SentimentSource::Detected);
        assert_eq!(r.error(), None);

        let r = classifier(Fixed::new("LABEL_2", 0.6)).classify("hm");
        assert_eq!(r.label, SentimentLabel::Neutral);
        assert_eq!(r.source, SentimentSource::Detected);
    }

    #[test]
    fn blank_input_skips_model() {
        let c = classifier(Fixed::new("positive", 0.99));
        for text in ["", "   ", "\n\t"] {
            let r = c.classify(text);
            assert_eq!(r.label, SentimentLabel::Neutral);
            assert_eq!(r.confidence, 0.0);
            assert_eq!(r.interpretation, ConfidenceTier::Low);
            assert_eq!(r.error().as_deref(), Some("Empty input"));
        }
        assert_eq!(c.model().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn backend_error_is_neutral_with_message() {
        let r = classifier(Broken).classify("anything");
        assert_eq!(r.label, SentimentLabel::Neutral);
        assert_eq!(r.confidence, 0.0);
        assert!(r.is_fallback());
        assert_eq!(r.error().as_deref(), Some("classifier unavailable"));
    }

    #[test]
    fn scores_are_clamped() {
        assert_eq!(classifier(Fixed::new("negative", 1.7)).classify("x").confidence, 1.0);
        assert_eq!(classifier(Fixed::new("negative", -0.2)).classify("x").confidence, 0.0);
        assert_eq!(classifier(Fixed::new("negative", f32::NAN)).classify("x").confidence, 0.0);
    }

    #[test]
    fn override_skips_model() {
        let c = classifier(Fixed::new("positive", 0.99));
        let r = c.classify_with_override("great", Some(SentimentLabel::Negative));
        assert_eq!(r.label, SentimentLabel::Negative);
        assert_eq!(r.confidence, 1.0);
        assert_eq!(r.source, SentimentSource::Manual);
        assert_eq!(c.model().calls.load(Ordering::SeqCst), 0);

        let r = c.classify_with_override("great", None);
        assert_eq!(r.source, SentimentSource::Detected);
        assert_eq!(c.model().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tiers_use_strict_thresholds() {
        let c = classifier(Broken);
        assert_eq!(c.interpret(0.95), ConfidenceTier::VeryConfident);
        assert_eq!(c.interpret(0.9), ConfidenceTier::Confident);
        assert_eq!(c.interpret(0.75), ConfidenceTier::Confident);
        assert_eq!(c.interpret(0.7), ConfidenceTier::ModeratelyConfident);
        assert_eq!(c.interpret(0.5), ConfidenceTier::Low);
        assert_eq!(c.interpret(0.0), ConfidenceTier::Low);
    }
}
