//! Error types for this crate.
//!
//! Fallible construction (loading models, reading configuration) returns
//! [`Result<T>`], which uses [`PipelineError`] as the error type. The
//! request-level operations ([`classify`](crate::sentiment::SentimentClassifier::classify),
//! [`generate`](crate::text_generation::GenerationOrchestrator::generate)) never
//! return these errors; they downgrade them into ordinary values instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use sentiment_writer::error::PipelineError;
//!
//! fn handle_error(e: PipelineError) {
//!     match &e {
//!         PipelineError::Download(_) => {
//!             // Network issue - retry with backoff
//!         }
//!         PipelineError::Device(_) => {
//!             // GPU unavailable - fall back to CPU
//!         }
//!         PipelineError::Config(_) => {
//!             // Bad configuration file - fix and restart
//!         }
//!         _ => eprintln!("error: {e}"),
//!     }
//! }
//! ```

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// The generation backend failed mid-run.
    #[error("{0}")]
    Generation(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Invalid or unreadable configuration.
    #[error("{0}")]
    Config(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {value}"))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Config(value.to_string())
    }
}
