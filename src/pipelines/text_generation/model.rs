use super::params::GenerationParams;
use crate::error::Result;

/// A causal text-continuation capability.
///
/// Implementations return the generated sequence as text. Like a
/// transformers text-generation pipeline, the output is expected to start
/// with `prompt` verbatim, but callers must not rely on it.
pub trait TextGenerationModel: Send + Sync {
    /// Continue `prompt`, producing exactly one sequence of at most
    /// `params.max_length` tokens in total (prompt included).
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}
