use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use crate::loaders::{HfLoader, TokenizerLoader};
use crate::pipelines::sentiment::{RawSentiment, SentimentAnalysisModel};

/// Available ModernBERT sentiment checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    #[default]
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    pub(crate) fn repo_id(self) -> &'static str {
        match self {
            ModernBertSize::Base => "clapAI/modernBERT-base-multilingual-sentiment",
            ModernBertSize::Large => "clapAI/modernBERT-large-multilingual-sentiment",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

/// ModernBERT fine-tuned for 3-way sentiment classification.
///
/// Construct through [`SentimentAnalysisPipelineBuilder::modernbert`](crate::sentiment::SentimentAnalysisPipelineBuilder::modernbert).
pub struct SentimentModernBertModel {
    model: CandleModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    id2label: HashMap<String, String>,
}

impl SentimentModernBertModel {
    pub(crate) fn new(size: ModernBertSize, device: Device) -> Result<Self> {
        let repo_id = size.repo_id();

        let (config, vb, id2label) = load_classifier_model_with_id2label(repo_id, &device)?;
        let model = CandleModernBertForSequenceClassification::load(vb, &config)?;
        let tokenizer = TokenizerLoader::new(repo_id, "tokenizer.json").load()?;

        Ok(Self {
            model,
            tokenizer,
            device,
            id2label,
        })
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl SentimentAnalysisModel for SentimentModernBertModel {
    fn predict_with_score(&self, text: &str) -> Result<RawSentiment> {
        let tokens = self.tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let pred_id = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;

        let probs = softmax(&logits, D::Minus1)?;
        let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;
        let score = probs_vec.get(pred_id as usize).copied().unwrap_or(0.0);

        let label = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or_else(|| {
                let available: Vec<&str> = self.id2label.keys().map(String::as_str).collect();
                PipelineError::Unexpected(format!(
                    "Predicted label ID {} not in id2label. Available: {}",
                    pred_id,
                    available.join(", ")
                ))
            })?
            .clone();

        Ok(RawSentiment { label, score })
    }
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

// candle's config only keeps the classifier head when id2label is present,
// so rebuild it from the label count when the checkpoint omits it.
fn patch_config_num_labels(config: &mut Config, id2label: &HashMap<String, String>) {
    let current = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0);
    if current == id2label.len() {
        return;
    }

    let label2id: HashMap<String, String> = id2label
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    config.classifier_config = Some(ClassifierConfig {
        id2label: id2label.clone(),
        label2id,
        classifier_pooling: ClassifierPooling::default(),
    });
}

fn load_classifier_model_with_id2label(
    repo_id: &str,
    device: &Device,
) -> Result<(Config, VarBuilder<'static>, HashMap<String, String>)> {
    let config_path = HfLoader::new(repo_id, "config.json").load()?;
    let weights_path = HfLoader::new(repo_id, "model.safetensors")
        .load()
        .or_else(|_| HfLoader::new(repo_id, "pytorch_model.bin").load())?;

    let config_str = std::fs::read_to_string(&config_path)?;
    let mut config: Config = serde_json::from_str(&config_str)?;
    let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;

    let id2label = if class_cfg.id2label.is_empty() {
        class_cfg
            .label2id
            .iter()
            .map(|(label, id)| (id.to_string(), label.clone()))
            .collect()
    } else {
        class_cfg.id2label
    };
    patch_config_num_labels(&mut config, &id2label);

    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        // SAFETY: the hub cache file is not modified while mapped.
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok((config, vb, id2label))
}
