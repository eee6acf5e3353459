use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use super::model::TextGenerationModel;
use super::params::GenerationParams;
use super::prompt::PromptComposer;
use super::sanitize;
use crate::config::{LengthConfig, SamplingConfig, SeedConfig, WriterConfig};
use crate::error::PipelineError;
use crate::pipelines::sentiment::SentimentLabel;

/// Why a generation produced no text.
///
/// The `Display` form is the message [`GenerationOrchestrator::generate`]
/// returns in place of text.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The prompt was empty or whitespace-only. The model was not called.
    #[error("Error: Empty prompt provided.")]
    EmptyPrompt,

    /// The generation backend failed.
    #[error("Error generating text: {0}")]
    Backend(#[source] PipelineError),
}

/// Composes a sentiment-flavoured prompt, runs the generator once, and
/// cleans the output.
///
/// Construct with [`TextGenerationPipelineBuilder`](super::TextGenerationPipelineBuilder)
/// or, for a model you already hold, [`GenerationOrchestrator::new`].
///
/// # Examples
///
/// ```rust,no_run
/// # use sentiment_writer::config::WriterConfig;
/// # use sentiment_writer::sentiment::SentimentLabel;
/// # use sentiment_writer::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};
/// # fn main() -> sentiment_writer::error::Result<()> {
/// let config = WriterConfig::default();
/// let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
///     .config(&config)
///     .build()?;
///
/// let text = generator.generate("a rainy afternoon", SentimentLabel::Neutral, Some(120));
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub struct GenerationOrchestrator<M: TextGenerationModel> {
    model: Arc<M>,
    composer: PromptComposer,
    sampling: SamplingConfig,
    lengths: LengthConfig,
    seeds: SeedConfig,
    rng: Mutex<StdRng>,
}

impl<M: TextGenerationModel> GenerationOrchestrator<M> {
    /// Wrap a shared model handle with the given configuration.
    pub fn new(model: Arc<M>, config: &WriterConfig) -> Self {
        let rng = match config.seeds.initial {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            model,
            composer: PromptComposer::new(config.templates.clone()),
            sampling: config.sampling.clone(),
            lengths: config.lengths.clone(),
            seeds: config.seeds.clone(),
            rng: Mutex::new(rng),
        }
    }

    /// The underlying model handle.
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn lengths(&self) -> &LengthConfig {
        &self.lengths
    }

    /// Reset the random source that picks style words and sampler seeds.
    pub fn reseed(&self, seed: u64) {
        *self.rng.lock().unwrap_or_else(PoisonError::into_inner) = StdRng::seed_from_u64(seed);
    }

    /// The `max_length` a request for `length` resolves to.
    pub fn effective_length(&self, length: Option<i64>) -> usize {
        self.lengths.clamp(length)
    }

    /// Generate text, reporting failures as [`GenerationFailure`].
    pub fn try_generate(
        &self,
        prompt: &str,
        sentiment: SentimentLabel,
        length: Option<i64>,
    ) -> Result<String, GenerationFailure> {
        if prompt.trim().is_empty() {
            return Err(GenerationFailure::EmptyPrompt);
        }

        let max_length = self.effective_length(length);

        let (enhanced_prompt, seed) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let enhanced = self.composer.compose(prompt, sentiment, &mut *rng);
            (enhanced, rng.random::<u64>())
        };
        tracing::debug!(%sentiment, max_length, seed, prompt = %enhanced_prompt, "composed prompt");

        let params = GenerationParams::from_config(&self.sampling, max_length, seed);
        let raw = self
            .model
            .generate(&enhanced_prompt, &params)
            .map_err(GenerationFailure::Backend)?;

        Ok(sanitize::clean(&raw, &enhanced_prompt))
    }

    /// Generate text for `prompt` in the tone of `sentiment`.
    ///
    /// Never fails: an empty prompt or a backend error comes back as an
    /// error message in place of the text.
    pub fn generate(&self, prompt: &str, sentiment: SentimentLabel, length: Option<i64>) -> String {
        self.try_generate(prompt, sentiment, length)
            .unwrap_or_else(|failure| {
                if let GenerationFailure::Backend(e) = &failure {
                    tracing::warn!(error = %e, "text generation failed");
                }
                failure.to_string()
            })
    }

    /// Generate `n` variations (default: the configured count).
    ///
    /// Before output `i` the random source is reseeded with `base + i`, which
    /// makes the batch reproducible and nudges outputs apart. Distinct
    /// outputs are not guaranteed.
    pub fn generate_multiple(
        &self,
        prompt: &str,
        sentiment: SentimentLabel,
        length: Option<i64>,
        n: Option<usize>,
    ) -> Vec<String> {
        let n = n.unwrap_or(self.seeds.variations);
        (0..n)
            .map(|i| {
                self.reseed(self.seeds.base.wrapping_add(i as u64));
                self.generate(prompt, sentiment, length)
            })
            .collect()
    }
}
