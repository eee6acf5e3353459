//! One-stop facade over the classifier and the generator.

use serde::Serialize;
use std::sync::Arc;

use crate::config::WriterConfig;
use crate::error::Result;
use crate::models::{Qwen3, SentimentModernBertModel};
use crate::pipelines::sentiment::{
    SentimentAnalysisModel, SentimentAnalysisPipelineBuilder, SentimentClassifier, SentimentLabel,
    SentimentResult,
};
use crate::pipelines::text_generation::{
    GenerationOrchestrator, TextGenerationModel, TextGenerationPipelineBuilder,
};

/// A writer running both models locally through candle.
pub type LocalSentimentWriter = SentimentWriter<SentimentModernBertModel, Qwen3>;

/// Everything needed for one write.
#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    /// What to write about.
    pub prompt: String,
    /// Skip detection and write in this tone.
    pub sentiment: Option<SentimentLabel>,
    /// Requested `max_length`; clamped before use.
    pub length: Option<i64>,
}

impl WriteRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn sentiment(mut self, sentiment: SentimentLabel) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutput {
    /// The sentiment the text was written in.
    pub sentiment: SentimentResult,
    pub text: String,
    pub word_count: usize,
}

/// Classifier and generator loaded once and shared across calls.
///
/// # Example
///
/// ```rust,no_run
/// use sentiment_writer::config::WriterConfig;
/// use sentiment_writer::writer::{LocalSentimentWriter, WriteRequest};
///
/// # fn main() -> sentiment_writer::error::Result<()> {
/// let writer = LocalSentimentWriter::load(&WriterConfig::default())?;
/// let output = writer.write(&WriteRequest::new("a beautiful sunny day").length(80));
/// println!("{} ({} words)", output.text, output.word_count);
/// # Ok(())
/// # }
/// ```
pub struct SentimentWriter<S: SentimentAnalysisModel, G: TextGenerationModel> {
    classifier: SentimentClassifier<S>,
    generator: GenerationOrchestrator<G>,
}

impl LocalSentimentWriter {
    /// Download (if needed) and load both models described by `config`.
    pub fn load(config: &WriterConfig) -> Result<Self> {
        config.validate()?;

        let classifier = SentimentAnalysisPipelineBuilder::modernbert(config.models.sentiment)
            .config(config)
            .device(config.models.device)
            .build()?;
        let generator = TextGenerationPipelineBuilder::qwen3(config.models.generation)
            .config(config)
            .device(config.models.device)
            .build()?;

        tracing::info!("models ready");
        Ok(Self::from_parts(classifier, generator))
    }
}

impl<S: SentimentAnalysisModel, G: TextGenerationModel> SentimentWriter<S, G> {
    /// Wrap already-loaded model handles.
    pub fn new(sentiment_model: Arc<S>, generation_model: Arc<G>, config: &WriterConfig) -> Self {
        Self::from_parts(
            SentimentClassifier::new(sentiment_model, config),
            GenerationOrchestrator::new(generation_model, config),
        )
    }

    pub fn from_parts(classifier: SentimentClassifier<S>, generator: GenerationOrchestrator<G>) -> Self {
        Self {
            classifier,
            generator,
        }
    }

    pub fn classifier(&self) -> &SentimentClassifier<S> {
        &self.classifier
    }

    pub fn generator(&self) -> &GenerationOrchestrator<G> {
        &self.generator
    }

    pub fn classify(&self, text: &str) -> SentimentResult {
        self.classifier.classify(text)
    }

    pub fn classify_with_override(&self, text: &str, manual: Option<SentimentLabel>) -> SentimentResult {
        self.classifier.classify_with_override(text, manual)
    }

    pub fn generate(&self, prompt: &str, sentiment: SentimentLabel, length: Option<i64>) -> String {
        self.generator.generate(prompt, sentiment, length)
    }

    pub fn generate_multiple(
        &self,
        prompt: &str,
        sentiment: SentimentLabel,
        length: Option<i64>,
        n: Option<usize>,
    ) -> Vec<String> {
        self.generator.generate_multiple(prompt, sentiment, length, n)
    }

    /// Detect (or take) the sentiment of the prompt, then write in that tone.
    pub fn write(&self, request: &WriteRequest) -> WriteOutput {
        let sentiment = self.classify_with_override(&request.prompt, request.sentiment);
        let text = self.generate(&request.prompt, sentiment.label, request.length);
        let word_count = word_count(&text);

        WriteOutput {
            sentiment,
            text,
            word_count,
        }
    }
}

/// Whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
