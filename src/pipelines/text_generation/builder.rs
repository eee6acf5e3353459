use std::sync::Arc;

use super::pipeline::GenerationOrchestrator;
use crate::config::WriterConfig;
use crate::error::Result;
use crate::models::{Qwen3, Qwen3Size};
use crate::pipelines::utils::DeviceRequest;

crate::pipelines::utils::impl_device_methods!(TextGenerationPipelineBuilder);

/// Builder for a [`GenerationOrchestrator`] backed by a local Qwen 3 model.
///
/// # Example
///
/// ```rust,no_run
/// use sentiment_writer::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};
///
/// # fn main() -> sentiment_writer::error::Result<()> {
/// let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
///     .temperature(0.7)
///     .top_p(0.9)
///     .seed(7)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TextGenerationPipelineBuilder {
    size: Qwen3Size,
    config: WriterConfig,
    device_request: DeviceRequest,
}

impl TextGenerationPipelineBuilder {
    /// Create a builder for a Qwen 3 model.
    pub fn qwen3(size: Qwen3Size) -> Self {
        Self {
            size,
            config: WriterConfig::default(),
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Take sampling, length, template and seed settings from `config`.
    pub fn config(mut self, config: &WriterConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Set sampling temperature. 0.0 = deterministic, higher = more random.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.sampling.temperature = temperature;
        self
    }

    /// Only sample from the top k most likely tokens.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.sampling.top_k = top_k;
        self
    }

    /// Set nucleus sampling threshold (0.0-1.0).
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.config.sampling.top_p = top_p.clamp(0.0, 1.0);
        self
    }

    /// Set the seed of the style-word and sampler random source.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seeds.initial = Some(seed);
        self
    }

    /// Download (if needed) and load the model, then wrap it.
    pub fn build(self) -> Result<GenerationOrchestrator<Qwen3>> {
        self.config.validate()?;
        let device = self.device_request.resolve()?;

        tracing::info!(model = %self.size, ?device, "loading text generation model");
        let model = Qwen3::from_hf(&device, self.size)?;
        tracing::info!(model = %self.size, "text generation model loaded");

        Ok(GenerationOrchestrator::new(Arc::new(model), &self.config))
    }
}
