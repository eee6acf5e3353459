pub(crate) mod modernbert;
pub(crate) mod qwen3;

pub use modernbert::{ModernBertSize, SentimentModernBertModel};
pub use qwen3::{ModelInfo, Qwen3, Qwen3Size};
