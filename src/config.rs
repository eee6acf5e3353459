//! Runtime configuration.
//!
//! Everything the pipelines treat as a tunable (model choice, sampling,
//! length bounds, prompt templates, confidence thresholds, emoji) lives in
//! [`WriterConfig`]. Every section has a default, so a JSON file only needs
//! to name the values it changes:
//!
//! ```json
//! {
//!   "sampling": { "temperature": 0.7 },
//!   "lengths": { "max": 300 }
//! }
//! ```

use crate::error::{PipelineError, Result};
use crate::models::{ModernBertSize, Qwen3Size};
use crate::pipelines::sentiment::{ConfidenceTier, SentimentLabel};
use crate::pipelines::utils::DeviceRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration consumed by the pipelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Which models to load and where.
    pub models: ModelConfig,
    /// Sampling parameters handed to the generator.
    pub sampling: SamplingConfig,
    /// Length bounds and presets.
    pub lengths: LengthConfig,
    /// Prompt template per sentiment.
    pub templates: PromptTemplates,
    /// Thresholds for interpreting classifier confidence.
    pub confidence: ConfidenceTiers,
    /// Display glyph per sentiment.
    pub emoji: EmojiMap,
    /// Random seeds.
    pub seeds: SeedConfig,
}

impl WriterConfig {
    /// Read and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content).map_err(|e| {
            PipelineError::Config(format!("Invalid config file '{}': {e}", path.display()))
        })
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: WriterConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.lengths.validate()?;
        self.sampling.validate()?;
        self.confidence.validate()?;
        for label in SentimentLabel::ALL {
            if self.templates.get(label).style_words.is_empty() {
                return Err(PipelineError::Config(format!(
                    "templates.{label}.style_words must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Model selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Sentiment classifier checkpoint.
    pub sentiment: ModernBertSize,
    /// Causal generator checkpoint.
    pub generation: Qwen3Size,
    /// Device both models are loaded onto.
    pub device: DeviceRequest,
}

/// Sampling parameters for the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sample from the distribution instead of taking the arg-max.
    pub do_sample: bool,
    /// Randomness of sampling.
    pub temperature: f64,
    /// Only sample from the `top_k` most likely tokens (0 disables).
    pub top_k: usize,
    /// Nucleus sampling threshold in `(0, 1]`.
    pub top_p: f64,
    /// Penalty for repeating tokens. 1.0 = no penalty.
    pub repeat_penalty: f32,
    /// How many recent tokens the repeat penalty looks at.
    pub repeat_last_n: usize,
    /// Token that also ends generation, alongside the model's EOS tokens.
    pub pad_token_id: Option<u32>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            do_sample: true,
            temperature: 0.8,
            top_k: 50,
            top_p: 0.95,
            repeat_penalty: 1.0,
            repeat_last_n: 64,
            pad_token_id: None,
        }
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(PipelineError::Config(format!(
                "sampling.temperature must be >= 0, got {}",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(PipelineError::Config(format!(
                "sampling.top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        if !self.repeat_penalty.is_finite() || self.repeat_penalty <= 0.0 {
            return Err(PipelineError::Config(format!(
                "sampling.repeat_penalty must be > 0, got {}",
                self.repeat_penalty
            )));
        }
        Ok(())
    }
}

/// Named output lengths offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPreset {
    /// A few sentences.
    Short,
    /// A paragraph.
    Medium,
    /// Several paragraphs.
    Long,
}

impl std::str::FromStr for LengthPreset {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(LengthPreset::Short),
            "medium" => Ok(LengthPreset::Medium),
            "long" => Ok(LengthPreset::Long),
            other => Err(PipelineError::Config(format!(
                "unknown length preset '{other}', expected one of: short, medium, long"
            ))),
        }
    }
}

/// Token counts behind each [`LengthPreset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthPresets {
    /// Tokens for [`LengthPreset::Short`].
    pub short: usize,
    /// Tokens for [`LengthPreset::Medium`].
    pub medium: usize,
    /// Tokens for [`LengthPreset::Long`].
    pub long: usize,
}

impl Default for LengthPresets {
    fn default() -> Self {
        Self {
            short: 80,
            medium: 150,
            long: 300,
        }
    }
}

/// Bounds on `max_length`, the total token budget (prompt included).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthConfig {
    /// Smallest length ever passed to the generator.
    pub min: usize,
    /// Largest length ever passed to the generator.
    pub max: usize,
    /// Length used when the caller gives none.
    pub default: usize,
    /// Named presets.
    pub presets: LengthPresets,
}

impl Default for LengthConfig {
    fn default() -> Self {
        Self {
            min: 50,
            max: 500,
            default: 150,
            presets: LengthPresets::default(),
        }
    }
}

impl LengthConfig {
    /// Resolve a requested length: missing means the default, and the result
    /// always lies in `[min, max]`. Zero and negative requests clamp to `min`.
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        let min = i64::try_from(self.min).unwrap_or(i64::MAX);
        let max = i64::try_from(self.max).unwrap_or(i64::MAX);
        let requested = requested.unwrap_or_else(|| i64::try_from(self.default).unwrap_or(max));
        // min wins if the bounds are inverted, like max(MIN, min(length, MAX))
        requested.min(max).max(min) as usize
    }

    /// Token count for a preset.
    pub fn preset(&self, preset: LengthPreset) -> usize {
        match preset {
            LengthPreset::Short => self.presets.short,
            LengthPreset::Medium => self.presets.medium,
            LengthPreset::Long => self.presets.long,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(PipelineError::Config(format!(
                "lengths.min ({}) is greater than lengths.max ({})",
                self.min, self.max
            )));
        }
        if self.default < self.min || self.default > self.max {
            return Err(PipelineError::Config(format!(
                "lengths.default ({}) is outside [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Instruction prefix and style vocabulary for one sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Prepended to the user's prompt.
    pub prefix: String,
    /// One of these is picked at random per call.
    pub style_words: Vec<String>,
}

impl PromptTemplate {
    /// Build a template from string literals.
    pub fn new(prefix: &str, style_words: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            style_words: style_words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// One [`PromptTemplate`] per sentiment. The three fields keep the key
/// space closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    /// Template for positive text.
    pub positive: PromptTemplate,
    /// Template for negative text.
    pub negative: PromptTemplate,
    /// Template for neutral text, also the fallback.
    pub neutral: PromptTemplate,
}

impl PromptTemplates {
    /// Template for `label`.
    pub fn get(&self, label: SentimentLabel) -> &PromptTemplate {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            positive: PromptTemplate::new(
                "Write an uplifting and positive text about: ",
                &["wonderful", "amazing", "delightful", "excellent", "fantastic"],
            ),
            negative: PromptTemplate::new(
                "Write a critical and negative text about: ",
                &[
                    "disappointing",
                    "unfortunate",
                    "problematic",
                    "concerning",
                    "troubling",
                ],
            ),
            neutral: PromptTemplate::new(
                "Write an objective and balanced text about: ",
                &[
                    "regarding",
                    "concerning",
                    "about",
                    "related to",
                    "pertaining to",
                ],
            ),
        }
    }
}

/// Strict lower bounds for each [`ConfidenceTier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTiers {
    /// Above this: very confident.
    pub very_confident: f32,
    /// Above this: confident.
    pub confident: f32,
    /// Above this: moderately confident. Otherwise low.
    pub moderately_confident: f32,
}

impl Default for ConfidenceTiers {
    fn default() -> Self {
        Self {
            very_confident: 0.9,
            confident: 0.7,
            moderately_confident: 0.5,
        }
    }
}

impl ConfidenceTiers {
    /// Map a confidence score onto a tier.
    pub fn interpret(&self, confidence: f32) -> ConfidenceTier {
        if confidence > self.very_confident {
            ConfidenceTier::VeryConfident
        } else if confidence > self.confident {
            ConfidenceTier::Confident
        } else if confidence > self.moderately_confident {
            ConfidenceTier::ModeratelyConfident
        } else {
            ConfidenceTier::Low
        }
    }

    fn validate(&self) -> Result<()> {
        let ordered = self.very_confident >= self.confident
            && self.confident >= self.moderately_confident;
        if !ordered {
            return Err(PipelineError::Config(format!(
                "confidence thresholds must be descending, got {} / {} / {}",
                self.very_confident, self.confident, self.moderately_confident
            )));
        }
        Ok(())
    }
}

/// Display glyph per sentiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiMap {
    /// Glyph for positive.
    pub positive: String,
    /// Glyph for negative.
    pub negative: String,
    /// Glyph for neutral and anything unrecognized.
    pub neutral: String,
}

impl Default for EmojiMap {
    fn default() -> Self {
        Self {
            positive: "😊".into(),
            negative: "😞".into(),
            neutral: "😐".into(),
        }
    }
}

impl EmojiMap {
    /// Glyph for `label`.
    pub fn get(&self, label: SentimentLabel) -> &str {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }

    /// Glyph for a raw label string; unknown names get the neutral glyph.
    pub fn for_raw_label(&self, raw: &str) -> &str {
        self.get(SentimentLabel::from_model_label(raw))
    }
}

/// Seeds for the generator's random source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed at startup. `None` seeds from the OS.
    pub initial: Option<u64>,
    /// `generate_multiple` reseeds with `base + index` before each output.
    pub base: u64,
    /// How many outputs `generate_multiple` produces by default.
    pub variations: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            initial: Some(42),
            base: 42,
            variations: 3,
        }
    }
}
