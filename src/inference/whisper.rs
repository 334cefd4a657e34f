//! whisper.cpp speech-to-text backend.

use crate::config::{ComputeDevice, ModelSettings};
use crate::error::{OppsumError, Result};
use crate::inference::{GenerationParams, SpeechModel};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::debug;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Routes whisper.cpp's stderr chatter through `tracing` exactly once.
static LOGGING_HOOKS: Once = Once::new();

/// Speech model backed by a loaded whisper.cpp context.
///
/// One context is not safe for concurrent generation, so it sits behind a
/// mutex and every call creates a fresh decoding state.
pub struct WhisperSpeechModel {
    context: Mutex<WhisperContext>,
    language: String,
    model_name: String,
}

impl WhisperSpeechModel {
    /// Load a ggml Whisper model from disk.
    pub fn load(path: &Path, settings: &ModelSettings) -> Result<Self> {
        LOGGING_HOOKS.call_once(whisper_rs::install_logging_hooks);

        if !path.exists() {
            return Err(OppsumError::ModelUnavailable(format!(
                "speech model not found at {}. Download a ggml Whisper model \
                 (for example ggml-base.en.bin) and point models.speech_model at it",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            OppsumError::ModelUnavailable(format!(
                "speech model path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper")
            .to_string();

        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu(settings.device == ComputeDevice::Auto);

        let context = WhisperContext::new_with_params(path_str, context_params)
            .map_err(|e| OppsumError::ModelUnavailable(format!("failed to load {}: {}", path.display(), e)))?;

        Ok(Self {
            context: Mutex::new(context),
            language: settings.language.clone(),
            model_name,
        })
    }
}

impl SpeechModel for WhisperSpeechModel {
    fn transcribe_window(
        &self,
        samples: &[f32],
        sample_rate: u32,
        params: &GenerationParams,
    ) -> Result<String> {
        // whisper.cpp skips buffers shorter than one second, which the tail
        // window of a chunked waveform often is.
        let padded;
        let audio = if samples.len() < sample_rate as usize {
            padded = pad_with_silence(samples, sample_rate as usize);
            &padded[..]
        } else {
            samples
        };

        let context = self
            .context
            .lock()
            .map_err(|e| OppsumError::ModelInference(format!("failed to acquire model lock: {}", e)))?;

        let mut state = context
            .create_state()
            .map_err(|e| OppsumError::ModelInference(format!("failed to create decoding state: {}", e)))?;

        let strategy = if params.beam_count > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: params.beam_count as i32,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        };

        let mut full_params = FullParams::new(strategy);
        if self.language == "auto" {
            full_params.set_language(None);
        } else {
            full_params.set_language(Some(&self.language));
        }
        full_params.set_max_tokens(params.max_new_tokens as i32);
        full_params.set_print_special(false);
        full_params.set_print_progress(false);
        full_params.set_print_realtime(false);
        full_params.set_print_timestamps(false);

        state
            .full(full_params, audio)
            .map_err(|e| OppsumError::ModelInference(format!("speech inference failed: {}", e)))?;

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
        }

        let text = text.trim().to_string();
        debug!("Window decoded to {} chars", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Extend `samples` to `minimum` with trailing silence.
fn pad_with_silence(samples: &[f32], minimum: usize) -> Vec<f32> {
    let mut padded = samples.to_vec();
    if padded.len() < minimum {
        padded.resize(minimum, 0.0);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_reports_unavailable() {
        let settings = ModelSettings::default();
        let result = WhisperSpeechModel::load(Path::new("/nonexistent/ggml-tiny.bin"), &settings);
        match result {
            Err(OppsumError::ModelUnavailable(msg)) => {
                assert!(msg.contains("/nonexistent/ggml-tiny.bin"));
            }
            other => panic!("expected ModelUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_short_window_is_padded_to_one_second() {
        let samples = vec![0.5_f32; 3_000];
        let padded = pad_with_silence(&samples, 16_000);
        assert_eq!(padded.len(), 16_000);
        assert_eq!(padded[..3_000], samples[..]);
        assert!(padded[3_000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_padding_leaves_long_windows_alone() {
        let samples = vec![0.1_f32; 20_000];
        let padded = pad_with_silence(&samples, 16_000);
        assert_eq!(padded.len(), 20_000);
    }
}
