//! Sentiment detection for free text.
//!
//! ```rust,no_run
//! use sentiment_writer::sentiment::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let classifier = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//!     let result = classifier.classify("I love Rust!");
//!     println!("{} {} ({:.2}, {})", result.emoji, result.label, result.confidence, result.interpretation);
//!     Ok(())
//! }
//! ```

pub(crate) mod builder;
pub(crate) mod label;
pub(crate) mod model;
pub(crate) mod pipeline;

pub use crate::models::{ModernBertSize, SentimentModernBertModel};
pub use builder::SentimentAnalysisPipelineBuilder;
pub use label::{ConfidenceTier, SentimentLabel};
pub use model::{RawSentiment, SentimentAnalysisModel};
pub use pipeline::{FallbackReason, SentimentClassifier, SentimentResult, SentimentSource};
