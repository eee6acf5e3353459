//! Sentiment-conditioned text generation.
//!
//! A user prompt plus a target sentiment is turned into an instruction for a
//! local causal language model. The raw continuation is then cleaned up for
//! display.
//!
//! ## Main Types
//!
//! - [`GenerationOrchestrator`] - Composes the prompt, calls the model, cleans the output
//! - [`TextGenerationPipelineBuilder`] - Loads a Qwen 3 model and wraps it
//! - [`PromptComposer`] - Builds the tone prefix and style sentence
//! - [`GenerationParams`] - Parameters of a single model call
//! - [`TextGenerationModel`] - The capability any generator backend provides
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_writer::sentiment::SentimentLabel;
//! use sentiment_writer::text_generation::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
//!         .temperature(0.7)
//!         .build()?;
//!
//!     let text = generator.generate("a beautiful sunny day", SentimentLabel::Positive, Some(150));
//!     println!("{text}");
//!
//!     for variation in generator.generate_multiple("city life", SentimentLabel::Negative, None, Some(3)) {
//!         println!("- {variation}");
//!     }
//!     Ok(())
//! }
//! ```

pub(crate) mod builder;
pub(crate) mod model;
pub mod params;
pub(crate) mod pipeline;
pub mod prompt;
pub mod sanitize;

pub use crate::models::{Qwen3, Qwen3Size};
pub use builder::TextGenerationPipelineBuilder;
pub use model::TextGenerationModel;
pub use params::GenerationParams;
pub use pipeline::{GenerationFailure, GenerationOrchestrator};
pub use prompt::PromptComposer;
pub use sanitize::clean;
