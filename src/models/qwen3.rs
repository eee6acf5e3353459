use candle_core::{DType, Device, Result as CandleResult, Tensor};
use candle_transformers::models::quantized_qwen3 as candle_qwen3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use crate::loaders::{GenerationConfigLoader, GgufModelLoader, TokenizerLoader};
use crate::pipelines::text_generation::params::apply_repeat_penalty;
use crate::pipelines::text_generation::{GenerationParams, TextGenerationModel};

const TOKENIZER_REPO: &str = "Qwen/Qwen3-0.6B";

/// Available Qwen 3 model sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qwen3Size {
    /// 0.6 billion parameters.
    #[default]
    #[serde(rename = "0.6b")]
    Size0_6B,
    /// 1.7 billion parameters.
    #[serde(rename = "1.7b")]
    Size1_7B,
    /// 4 billion parameters.
    #[serde(rename = "4b")]
    Size4B,
    /// 8 billion parameters.
    #[serde(rename = "8b")]
    Size8B,
}

impl Qwen3Size {
    pub(crate) fn to_id(self) -> (&'static str, &'static str) {
        match self {
            Qwen3Size::Size0_6B => ("unsloth/Qwen3-0.6B-GGUF", "Qwen3-0.6B-Q4_K_M.gguf"),
            Qwen3Size::Size1_7B => ("unsloth/Qwen3-1.7B-GGUF", "Qwen3-1.7B-Q4_K_M.gguf"),
            Qwen3Size::Size4B => ("unsloth/Qwen3-4B-GGUF", "Qwen3-4B-Q4_K_M.gguf"),
            Qwen3Size::Size8B => ("unsloth/Qwen3-8B-GGUF", "Qwen3-8B-Q4_K_M.gguf"),
        }
    }
}

impl std::fmt::Display for Qwen3Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Qwen3Size::Size0_6B => "qwen3-0.6b",
            Qwen3Size::Size1_7B => "qwen3-1.7b",
            Qwen3Size::Size4B => "qwen3-4b",
            Qwen3Size::Size8B => "qwen3-8b",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub num_layers: usize,
    pub max_seq_len: usize,
    pub dtype: DType,
    pub device: Device,
}

/// Quantized Qwen 3 used as a plain text-continuation model.
///
/// Construct through [`TextGenerationPipelineBuilder::qwen3`](crate::text_generation::TextGenerationPipelineBuilder::qwen3).
pub struct Qwen3 {
    weights: Arc<candle_qwen3::ModelWeights>,
    tokenizer: Tokenizer,
    info: ModelInfo,
    eos_token_ids: Vec<u32>,
}

impl Qwen3 {
    pub(crate) fn from_hf(device: &Device, size: Qwen3Size) -> Result<Self> {
        let (repo_id, file_name) = size.to_id();

        let (mut file, content) = GgufModelLoader::new(repo_id, file_name).load()?;

        let generation_config =
            GenerationConfigLoader::new(TOKENIZER_REPO, "generation_config.json").load()?;
        if generation_config.eos_token_ids.is_empty() {
            return Err(PipelineError::Unexpected(
                "No EOS tokens configured for Qwen3. Cannot determine when to stop.".to_string(),
            ));
        }

        let metadata_u32 = |key: &str| -> Result<usize> {
            let value = content.metadata.get(key).ok_or_else(|| {
                PipelineError::Unexpected(format!("Missing '{key}' in Qwen3 model metadata"))
            })?;
            Ok(value.to_u32()? as usize)
        };
        let num_layers = metadata_u32("qwen3.block_count")?;
        let max_seq_len = metadata_u32("qwen3.context_length")?;
        let dtype = match content.metadata.get("general.dtype") {
            Some(v) => match v.to_u32().unwrap_or(1) {
                0 => DType::F32,
                _ => DType::F16,
            },
            None => DType::F16,
        };
        let info = ModelInfo {
            num_layers,
            max_seq_len,
            dtype,
            device: device.clone(),
        };

        let weights = Arc::new(candle_qwen3::ModelWeights::from_gguf(
            content, &mut file, device,
        )?);
        let tokenizer = TokenizerLoader::new(TOKENIZER_REPO, "tokenizer.json").load()?;

        Ok(Self {
            weights,
            tokenizer,
            info,
            eos_token_ids: generation_config.eos_token_ids,
        })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn new_context(&self) -> Context {
        Context::new(self.weights.clone())
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, false).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(tokens, /*skip_special_tokens=*/ true)
            .map_err(|e| PipelineError::Tokenization(format!("Failed to decode tokens: {e}")))
    }

    fn sample_continuation(
        &self,
        prompt_tokens: &[u32],
        budget: usize,
        params: &GenerationParams,
    ) -> Result<Vec<u32>> {
        const CHUNK_SIZE: usize = 64;

        let device = &self.info.device;
        let mut context = self.new_context();
        let mut logits_processor = params.logits_processor();

        let mut stop_tokens = self.eos_token_ids.clone();
        stop_tokens.extend(params.pad_token_id);

        let mut last_logits = None;
        for chunk in prompt_tokens.chunks(CHUNK_SIZE) {
            let input = Tensor::new(chunk, device)?.unsqueeze(0)?;
            let logits = context.generate(&input)?;
            last_logits = Some(logits.squeeze(0)?);
        }
        let last_logits = last_logits
            .ok_or_else(|| PipelineError::Generation("Prompt produced no logits".to_string()))?;

        let mut generated: Vec<u32> = Vec::with_capacity(budget);
        let mut next_token = logits_processor.sample(&last_logits)?;
        while !stop_tokens.contains(&next_token) {
            generated.push(next_token);
            if generated.len() >= budget {
                break;
            }

            let input = Tensor::new(&[next_token], device)?.unsqueeze(0)?;
            let logits = context.generate(&input)?.squeeze(0)?;

            let start_at = generated.len().saturating_sub(params.repeat_last_n);
            let penalty_context = &generated[start_at..];
            let logits = if params.repeat_penalty == 1. || penalty_context.is_empty() {
                logits
            } else {
                apply_repeat_penalty(&logits, params.repeat_penalty, penalty_context)?
            };

            next_token = logits_processor.sample(&logits)?;
        }

        Ok(generated)
    }
}

impl TextGenerationModel for Qwen3 {
    /// Returns the prompt followed by the sampled continuation. `max_length`
    /// bounds prompt and continuation together.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let prompt_tokens = self.encode(prompt)?;
        if prompt_tokens.is_empty() {
            return Err(PipelineError::Tokenization(
                "Prompt encoded to zero tokens".to_string(),
            ));
        }

        let max_length = params.max_length.min(self.info.max_seq_len);
        let budget = max_length.saturating_sub(prompt_tokens.len());
        tracing::debug!(
            prompt_tokens = prompt_tokens.len(),
            max_length,
            budget,
            "qwen3 generation"
        );
        if budget == 0 {
            tracing::warn!(
                prompt_tokens = prompt_tokens.len(),
                max_length,
                "prompt fills the whole length budget, nothing generated"
            );
            return Ok(prompt.to_string());
        }

        let generated = self.sample_continuation(&prompt_tokens, budget, params)?;

        // Re-decode the whole sequence and cut at the decoded prompt, so the
        // echoed prefix is the caller's exact prompt text.
        let all_tokens: Vec<u32> = prompt_tokens.iter().chain(&generated).copied().collect();
        let full = self.decode(&all_tokens)?;
        let decoded_prompt = self.decode(&prompt_tokens)?;
        let continuation = match full.strip_prefix(decoded_prompt.as_str()) {
            Some(rest) => rest.to_string(),
            None => self.decode(&generated)?,
        };

        Ok(format!("{prompt}{continuation}"))
    }
}

pub(crate) struct Context {
    weights: candle_qwen3::ModelWeights,
    position: usize,
}

impl Context {
    pub(crate) fn new(weights: Arc<candle_qwen3::ModelWeights>) -> Self {
        let mut weights = (*weights).clone();
        weights.clear_kv_cache();
        Self {
            weights,
            position: 0,
        }
    }

    pub(crate) fn generate(&mut self, input_ids: &Tensor) -> CandleResult<Tensor> {
        let seq_len = input_ids.dim(1)?;
        let logits = self.weights.forward(input_ids, self.position)?;
        self.position += seq_len;
        Ok(logits)
    }
}
