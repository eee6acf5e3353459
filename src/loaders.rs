use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

/// A single file in a Hugging Face Hub model repository.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    /// Download the file (or reuse the local hub cache) and return its path.
    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
            })?;
        let hf_api = hf_api.model(self.repo.clone());

        let max_retries = 3u32;
        for attempt in 0..max_retries {
            match hf_api.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let error_msg = e.to_string();
                    // Concurrent downloads of the same file contend on the cache lock.
                    if error_msg.contains("Lock acquisition failed") && attempt + 1 < max_retries {
                        std::thread::sleep(Duration::from_millis(100 * (1 << attempt)));
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.repo, max_retries
        )))
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
}

impl TokenizerLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = self.tokenizer_file_loader.load()?;
        Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                tokenizer_file_path.display(),
                e
            ))
        })
    }
}

/// The subset of `generation_config.json` the generator needs.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub eos_token_ids: Vec<u32>,
}

#[derive(Deserialize)]
struct RawGenerationConfig {
    #[serde(alias = "eos_token_id", alias = "eos_token_ids")]
    eos_token_ids: Option<serde_json::Value>,
}

pub struct GenerationConfigLoader {
    pub generation_config_file_loader: HfLoader,
}

impl GenerationConfigLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            generation_config_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub fn load(&self) -> Result<GenerationConfig> {
        let path = self.generation_config_file_loader.load()?;
        let content = std::fs::read_to_string(path)?;
        parse_generation_config(&content)
    }
}

fn parse_generation_config(content: &str) -> Result<GenerationConfig> {
    let raw: RawGenerationConfig = serde_json::from_str(content)?;

    let as_token_id = |v: &serde_json::Value| -> Result<u32> {
        v.as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| {
                PipelineError::Unexpected(format!(
                    "Invalid eos_token_id: expected unsigned integer, got {v}"
                ))
            })
    };

    let eos_token_ids = match raw.eos_token_ids {
        Some(serde_json::Value::Array(arr)) => {
            arr.iter().map(as_token_id).collect::<Result<Vec<_>>>()?
        }
        Some(v @ serde_json::Value::Number(_)) => vec![as_token_id(&v)?],
        _ => Vec::new(),
    };

    Ok(GenerationConfig { eos_token_ids })
}

#[derive(Debug, Clone)]
pub struct GgufModelLoader {
    pub model_file_loader: HfLoader,
}

impl GgufModelLoader {
    pub fn new(model_repo: &str, model_filename: &str) -> Self {
        Self {
            model_file_loader: HfLoader::new(model_repo, model_filename),
        }
    }

    pub fn load(&self) -> Result<(std::fs::File, candle_core::quantized::gguf_file::Content)> {
        let model_file_path = self.model_file_loader.load()?;

        let mut file = std::fs::File::open(&model_file_path)?;
        let file_content = candle_core::quantized::gguf_file::Content::read(&mut file)
            .map_err(|e| e.with_path(model_file_path))?;

        Ok((file, file_content))
    }
}
