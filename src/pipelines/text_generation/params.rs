use candle_transformers::generation::{LogitsProcessor, Sampling};

use crate::config::SamplingConfig;

pub use candle_transformers::utils::apply_repeat_penalty;

/// Parameters for a single call into a [`TextGenerationModel`](super::TextGenerationModel).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Sample from the distribution. `false` means greedy decoding.
    pub do_sample: bool,
    /// Randomness of sampling. Ignored when `do_sample` is false.
    pub temperature: f64,
    /// Only consider the top k most likely tokens.
    pub top_k: Option<usize>,
    /// Nucleus sampling: only consider tokens with cumulative probability <= p.
    pub top_p: Option<f64>,
    /// Penalty for repeating tokens. 1.0 = no penalty.
    pub repeat_penalty: f32,
    /// Number of recent tokens to consider for repeat penalty.
    pub repeat_last_n: usize,
    /// Always 1; one prompt yields one text.
    pub num_return_sequences: usize,
    /// Upper bound on prompt plus generated tokens.
    pub max_length: usize,
    /// Padding token, treated as an extra stop token.
    pub pad_token_id: Option<u32>,
    /// Seed for the sampler.
    pub seed: u64,
}

impl GenerationParams {
    /// Build the per-call parameters from configuration.
    pub fn from_config(sampling: &SamplingConfig, max_length: usize, seed: u64) -> Self {
        Self {
            do_sample: sampling.do_sample,
            temperature: sampling.temperature,
            top_k: Some(sampling.top_k).filter(|k| *k > 0),
            top_p: Some(sampling.top_p).filter(|p| *p < 1.0),
            repeat_penalty: sampling.repeat_penalty,
            repeat_last_n: sampling.repeat_last_n,
            num_return_sequences: 1,
            max_length,
            pad_token_id: sampling.pad_token_id,
            seed,
        }
    }

    pub(crate) fn sampling_strategy(&self) -> Sampling {
        if !self.do_sample || self.temperature <= 0.0 {
            return Sampling::ArgMax;
        }

        let temperature = self.temperature.max(1e-7);
        let top_k = self.top_k.unwrap_or(0);
        let top_p = self.top_p.unwrap_or(1.0);

        match (top_k > 0, top_p < 1.0) {
            (true, true) => Sampling::TopKThenTopP {
                k: top_k,
                p: top_p,
                temperature,
            },
            (true, false) => Sampling::TopK {
                k: top_k,
                temperature,
            },
            (false, true) => Sampling::TopP {
                p: top_p,
                temperature,
            },
            (false, false) => Sampling::All { temperature },
        }
    }

    /// A fresh sampler seeded with [`seed`](Self::seed).
    pub fn logits_processor(&self) -> LogitsProcessor {
        LogitsProcessor::from_sampling(self.seed, self.sampling_strategy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sampling: &SamplingConfig) -> GenerationParams {
        GenerationParams::from_config(sampling, 120, 7)
    }

    #[test]
    fn defaults_sample_top_k_then_top_p() {
        let p = params(&SamplingConfig::default());
        assert_eq!(p.num_return_sequences, 1);
        assert_eq!(p.max_length, 120);
        assert_eq!(p.seed, 7);
        match p.sampling_strategy() {
            Sampling::TopKThenTopP { k, p, temperature } => {
                assert_eq!(k, 50);
                assert_eq!(p, 0.95);
                assert_eq!(temperature, 0.8);
            }
            _ => panic!("expected top-k then top-p"),
        }
    }

    #[test]
    fn greedy_when_sampling_disabled() {
        let sampling = SamplingConfig {
            do_sample: false,
            ..SamplingConfig::default()
        };
        assert!(matches!(params(&sampling).sampling_strategy(), Sampling::ArgMax));
    }

    #[test]
    fn zero_top_k_and_full_top_p_disable_filters() {
        let sampling = SamplingConfig {
            top_k: 0,
            top_p: 1.0,
            ..SamplingConfig::default()
        };
        let p = params(&sampling);
        assert_eq!(p.top_k, None);
        assert_eq!(p.top_p, None);
        assert!(matches!(p.sampling_strategy(), Sampling::All { .. }));
    }
}
