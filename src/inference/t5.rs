//! Quantized T5 text-to-text backend via candle.
//!
//! Loads a GGUF-quantized Flan-T5 model from a local directory and runs
//! greedy decoding with an incremental KV cache. The minimum-length
//! contract is honored by suppressing the end token until enough tokens
//! have been produced.

use crate::config::{ComputeDevice, ModelSettings};
use crate::error::{OppsumError, Result};
use crate::inference::{GenerationParams, TextModel};

use candle_core::{Device, Tensor};
use candle_transformers::models::quantized_t5::{Config as T5Config, T5ForConditionalGeneration};
use candle_transformers::quantized_var_builder::VarBuilder;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::Tokenizer;

/// T5 end-of-sequence token id.
const EOS_TOKEN: u32 = 1;
/// T5 pad token id, also the decoder start token.
const PAD_TOKEN: u32 = 0;

/// Files expected inside a text model directory.
const WEIGHTS_FILE: &str = "model.gguf";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Text model backed by a quantized T5 loaded through candle.
///
/// Decoding mutates the KV cache, so the model sits behind a mutex; the
/// tokenizer is shared freely.
pub struct CandleTextModel {
    model: Mutex<T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
}

impl CandleTextModel {
    /// Load a quantized T5 model directory (weights, config, tokenizer).
    pub fn load(dir: &Path, settings: &ModelSettings) -> Result<Self> {
        let weights_path = dir.join(WEIGHTS_FILE);
        let config_path = dir.join(CONFIG_FILE);
        let tokenizer_path = dir.join(TOKENIZER_FILE);

        for path in [&weights_path, &config_path, &tokenizer_path] {
            if !path.exists() {
                return Err(OppsumError::ModelUnavailable(format!(
                    "text model file not found at {}. The model directory must contain \
                     {WEIGHTS_FILE}, {CONFIG_FILE} and {TOKENIZER_FILE}",
                    path.display()
                )));
            }
        }

        let device = select_device(&settings.device);

        let config_bytes = std::fs::read(&config_path)?;
        let config: T5Config = serde_json::from_slice(&config_bytes)?;

        let vb = VarBuilder::from_gguf(&weights_path, &device).map_err(|e| {
            OppsumError::ModelUnavailable(format!("failed to load {}: {e}", weights_path.display()))
        })?;
        let model = T5ForConditionalGeneration::load(vb, &config)
            .map_err(|e| OppsumError::ModelUnavailable(format!("failed to initialize text model: {e}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            OppsumError::ModelUnavailable(format!("failed to load {}: {e}", tokenizer_path.display()))
        })?;

        let model_name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("t5")
            .to_string();

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            model_name,
        })
    }
}

impl TextModel for CandleTextModel {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| OppsumError::ModelInference(format!("tokenize: {e}")))?;
        let input_ids: Vec<u32> = encoding.get_ids().to_vec();

        let mut model = self
            .model
            .lock()
            .map_err(|e| OppsumError::ModelInference(format!("failed to acquire model lock: {e}")))?;
        model.clear_kv_cache();

        let input_tensor = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| OppsumError::ModelInference(format!("encoder input: {e}")))?;

        let encoder_output = model
            .encode(&input_tensor)
            .map_err(|e| OppsumError::ModelInference(format!("encoder forward: {e}")))?;

        // Greedy decode with an incremental KV cache. First step feeds the
        // pad token, every later step feeds only the newly chosen token.
        let mut decoded_ids: Vec<u32> = vec![PAD_TOKEN];
        let mut next_input = vec![PAD_TOKEN];

        for _ in 0..params.max_new_tokens {
            let decoder_input = Tensor::new(next_input.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| OppsumError::ModelInference(format!("decoder input: {e}")))?;

            let logits = model
                .decode(&decoder_input, &encoder_output)
                .map_err(|e| OppsumError::ModelInference(format!("decoder forward: {e}")))?;

            let seq_len = logits
                .dim(1)
                .map_err(|e| OppsumError::ModelInference(format!("logits dim: {e}")))?;
            let last_logits: Vec<f32> = logits
                .get_on_dim(1, seq_len - 1)
                .and_then(|t| t.squeeze(0))
                .and_then(|t| t.to_vec1::<f32>())
                .map_err(|e| OppsumError::ModelInference(format!("read logits: {e}")))?;

            let generated = decoded_ids.len() - 1;
            let next_token = best_token(&last_logits, generated < params.min_new_tokens);

            if next_token == EOS_TOKEN {
                break;
            }

            decoded_ids.push(next_token);
            next_input = vec![next_token];
        }

        // Skip the leading pad token; `true` drops remaining special tokens.
        let output = self
            .tokenizer
            .decode(&decoded_ids[1..], true)
            .map_err(|e| OppsumError::ModelInference(format!("detokenize: {e}")))?;

        Ok(output.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

fn select_device(device: &ComputeDevice) -> Device {
    match device {
        ComputeDevice::Cpu => Device::Cpu,
        ComputeDevice::Auto => {
            #[cfg(feature = "metal")]
            {
                if let Ok(metal) = Device::new_metal(0) {
                    return metal;
                }
            }
            Device::cuda_if_available(0).unwrap_or(Device::Cpu)
        }
    }
}

/// Index of the highest-scoring token, optionally excluding the end token.
fn best_token(logits: &[f32], suppress_end: bool) -> u32 {
    let mut best = PAD_TOKEN;
    let mut best_score = f32::NEG_INFINITY;
    for (id, &score) in logits.iter().enumerate() {
        if suppress_end && id as u32 == EOS_TOKEN {
            continue;
        }
        if score > best_score {
            best_score = score;
            best = id as u32;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_directory_reports_unavailable() {
        let settings = ModelSettings::default();
        let result = CandleTextModel::load(Path::new("/nonexistent/flan-t5"), &settings);
        match result {
            Err(OppsumError::ModelUnavailable(msg)) => {
                assert!(msg.contains("model.gguf"));
            }
            other => panic!("expected ModelUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_best_token_picks_argmax() {
        let logits = [0.1, 0.3, 0.9, 0.2];
        assert_eq!(best_token(&logits, false), 2);
    }

    #[test]
    fn test_best_token_suppresses_end_token() {
        // End token (id 1) scores highest, but the minimum length has not
        // been reached yet.
        let logits = [0.1, 0.9, 0.8, 0.2];
        assert_eq!(best_token(&logits, false), 1);
        assert_eq!(best_token(&logits, true), 2);
    }

    #[test]
    fn candle_text_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CandleTextModel>();
    }
}
