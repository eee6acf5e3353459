use std::sync::Arc;

use super::pipeline::SentimentClassifier;
use crate::config::WriterConfig;
use crate::error::Result;
use crate::models::{ModernBertSize, SentimentModernBertModel};
use crate::pipelines::utils::DeviceRequest;

crate::pipelines::utils::impl_device_methods!(SentimentAnalysisPipelineBuilder);

/// Builder for a [`SentimentClassifier`] backed by ModernBERT.
pub struct SentimentAnalysisPipelineBuilder {
    size: ModernBertSize,
    config: WriterConfig,
    device_request: DeviceRequest,
}

impl SentimentAnalysisPipelineBuilder {
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self {
            size,
            config: WriterConfig::default(),
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Take confidence thresholds and emoji from `config`.
    pub fn config(mut self, config: &WriterConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn build(self) -> Result<SentimentClassifier<SentimentModernBertModel>> {
        self.config.validate()?;
        let device = self.device_request.resolve()?;

        tracing::info!(model = %self.size, ?device, "loading sentiment model");
        let model = SentimentModernBertModel::new(self.size, device)?;
        tracing::info!(model = %self.size, "sentiment model loaded");

        Ok(SentimentClassifier::new(Arc::new(model), &self.config))
    }
}
