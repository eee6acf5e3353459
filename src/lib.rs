//! # Sentiment Writer
//!
//! Detect the sentiment of a piece of text, then have a local language model
//! write about a topic in that tone. Both models run on candle.
//!
//! - [`sentiment`] - classify text as positive, negative or neutral
//! - [`text_generation`] - generate text conditioned on a sentiment
//! - [`writer`] - both of the above behind one facade
//! - [`config`] - everything tunable, loadable from JSON

pub mod config;
pub mod error;
pub(crate) mod loaders;
pub mod models;
pub(crate) mod pipelines;
pub mod writer;

pub use config::WriterConfig;
pub use error::{PipelineError, Result};
pub use pipelines::utils::DeviceRequest;
pub use pipelines::{sentiment, text_generation};
pub use writer::{LocalSentimentWriter, SentimentWriter, WriteOutput, WriteRequest};
