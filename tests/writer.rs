//! End-to-end behaviour of the writer with stub models.
//! These run without downloading anything.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use sentiment_writer::config::{LengthPreset, WriterConfig};
use sentiment_writer::error::{PipelineError, Result};
use sentiment_writer::sentiment::{
    ConfidenceTier, RawSentiment, SentimentAnalysisModel, SentimentLabel, SentimentSource,
};
use sentiment_writer::text_generation::{
    GenerationFailure, GenerationParams, PromptComposer, TextGenerationModel,
};
use sentiment_writer::writer::{SentimentWriter, WriteRequest};

struct StubClassifier {
    label: &'static str,
    score: f32,
    calls: AtomicUsize,
}

impl StubClassifier {
    fn new(label: &'static str, score: f32) -> Self {
        Self {
            label,
            score,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SentimentAnalysisModel for StubClassifier {
    fn predict_with_score(&self, _text: &str) -> Result<RawSentiment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawSentiment {
            label: self.label.to_string(),
            score: self.score,
        })
    }
}

/// Echoes the prompt followed by a fixed continuation, like a
/// `return_full_text` generation pipeline.
#[derive(Default)]
struct EchoGenerator {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    lengths: Mutex<Vec<usize>>,
}

impl TextGenerationModel for EchoGenerator {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.lengths.lock().unwrap().push(params.max_length);
        Ok(format!("{prompt}The sun  warmed every street and everyone smiled"))
    }
}

struct FailingGenerator;

impl TextGenerationModel for FailingGenerator {
    fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        Err(PipelineError::Generation("model exploded".into()))
    }
}

fn writer(
    label: &'static str,
    score: f32,
) -> SentimentWriter<StubClassifier, EchoGenerator> {
    SentimentWriter::new(
        Arc::new(StubClassifier::new(label, score)),
        Arc::new(EchoGenerator::default()),
        &WriterConfig::default(),
    )
}

#[test]
fn blank_text_classifies_as_neutral_zero() {
    let w = writer("positive", 0.99);
    for text in ["", "   "] {
        let result = w.classify(text);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.confidence, 0.0);
    }
    assert_eq!(w.classifier().model().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn compose_starts_with_prefix_and_contains_prompt() {
    let config = WriterConfig::default();
    let composer = PromptComposer::new(config.templates.clone());
    let mut rng = StdRng::seed_from_u64(5);

    for label in SentimentLabel::ALL {
        let prompt = composer.compose("autumn leaves", label, &mut rng);
        assert!(prompt.starts_with(&config.templates.get(label).prefix));
        assert!(prompt.contains("autumn leaves"));
    }
}

#[test]
fn unknown_label_composes_like_neutral() {
    let composer = PromptComposer::default();
    for raw in ["mixed", "LABEL_7", ""] {
        let unknown = composer.compose(
            "x",
            SentimentLabel::from_model_label(raw),
            &mut StdRng::seed_from_u64(11),
        );
        let neutral = composer.compose("x", SentimentLabel::Neutral, &mut StdRng::seed_from_u64(11));
        assert_eq!(unknown, neutral);
    }
}

#[test]
fn lengths_are_clamped_before_generation() {
    let w = writer("positive", 0.9);
    for requested in [-10, 0, 1, 49, 50, 80, 500, 501, 10_000] {
        w.generate("rain", SentimentLabel::Neutral, Some(requested));
    }
    w.generate("rain", SentimentLabel::Neutral, None);

    let lengths = w.generator().model().lengths.lock().unwrap().clone();
    assert_eq!(lengths, vec![50, 50, 50, 50, 50, 80, 500, 500, 500, 150]);
}

#[test]
fn empty_prompt_never_reaches_generator() {
    let w = writer("positive", 0.9);
    assert_eq!(
        w.generate("", SentimentLabel::Positive, Some(100)),
        "Error: Empty prompt provided."
    );
    assert!(matches!(
        w.generator().try_generate("  ", SentimentLabel::Positive, Some(100)),
        Err(GenerationFailure::EmptyPrompt)
    ));
    assert_eq!(w.generator().model().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sunny_day_end_to_end() {
    let w = writer("positive", 0.97);
    let text = w.generate("a beautiful sunny day", SentimentLabel::Positive, Some(80));

    let prompts = w.generator().model().prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    let composed = &prompts[0];

    let style_words = &WriterConfig::default().templates.positive.style_words;
    assert_eq!(style_words.len(), 5);
    assert!(style_words.iter().any(|word| composed
        == &format!(
            "Write an uplifting and positive text about: a beautiful sunny day. This is {word}. "
        )));

    assert!(!text.starts_with(composed.as_str()));
    assert!(!text.is_empty());
    assert!(text.ends_with(['.', '!', '?']));
    assert_eq!(text, "The sun warmed every street and everyone smiled.");
}

#[test]
fn confidence_tiers() {
    let w = writer("positive", 0.9);
    let names: Vec<&str> = [0.95, 0.75, 0.55, 0.3]
        .into_iter()
        .map(|c| w.classifier().interpret(c).as_str())
        .collect();
    assert_eq!(
        names,
        ["Very confident", "Confident", "Moderately confident", "Low confidence"]
    );
}

#[test]
fn generation_failure_is_reported_in_text() {
    let w = SentimentWriter::new(
        Arc::new(StubClassifier::new("negative", 0.8)),
        Arc::new(FailingGenerator),
        &WriterConfig::default(),
    );
    assert_eq!(
        w.generate("storms", SentimentLabel::Negative, None),
        "Error generating text: model exploded"
    );
}

#[test]
fn write_detects_then_generates() {
    let w = writer("NEGATIVE", 0.82);
    let out = w.write(&WriteRequest::new("Monday mornings").length(120));

    assert_eq!(out.sentiment.label, SentimentLabel::Negative);
    assert_eq!(out.sentiment.interpretation, ConfidenceTier::Confident);
    assert_eq!(out.sentiment.emoji, "😞");
    assert_eq!(out.sentiment.source, SentimentSource::Detected);
    assert_eq!(out.word_count, 8);

    let prompts = w.generator().model().prompts.lock().unwrap().clone();
    assert!(prompts[0].starts_with("Write a critical and negative text about: Monday mornings. "));
}

#[test]
fn write_with_override_skips_detection() {
    let w = writer("negative", 0.99);
    let out = w.write(&WriteRequest::new("Monday mornings").sentiment(SentimentLabel::Positive));

    assert_eq!(out.sentiment.label, SentimentLabel::Positive);
    assert_eq!(out.sentiment.confidence, 1.0);
    assert_eq!(out.sentiment.source, SentimentSource::Manual);
    assert_eq!(w.classifier().model().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn variations_are_reproducible() {
    let a = writer("positive", 0.9);
    let b = writer("positive", 0.9);

    let first = a.generate_multiple("the sea", SentimentLabel::Positive, None, None);
    let second = b.generate_multiple("the sea", SentimentLabel::Positive, None, None);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);

    let prompts_a = a.generator().model().prompts.lock().unwrap().clone();
    let prompts_b = b.generator().model().prompts.lock().unwrap().clone();
    assert_eq!(prompts_a, prompts_b);
}

#[test]
fn config_file_overrides_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "lengths": {{ "min": 20, "max": 200, "default": 60, "presets": {{ "short": 30 }} }},
            "seeds": {{ "variations": 2 }}
        }}"#
    )?;

    let config = WriterConfig::from_file(file.path())?;
    assert_eq!(config.lengths.preset(LengthPreset::Short), 30);
    assert_eq!(config.lengths.preset(LengthPreset::Long), 300);

    let w = SentimentWriter::new(
        Arc::new(StubClassifier::new("positive", 0.9)),
        Arc::new(EchoGenerator::default()),
        &config,
    );
    let outs = w.generate_multiple("hills", SentimentLabel::Neutral, Some(1_000), None);
    assert_eq!(outs.len(), 2);
    assert_eq!(*w.generator().model().lengths.lock().unwrap(), vec![200, 200]);
    Ok(())
}

#[test]
fn invalid_config_file_is_rejected() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{ "lengths": {{ "min": 300, "max": 100 }} }}"#)?;
    assert!(WriterConfig::from_file(file.path()).is_err());
    Ok(())
}
