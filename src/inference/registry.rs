//! Process-wide registry of loaded model handles.
//!
//! Model weights load once per process and are shared across windows,
//! requests, and jobs. The registry maps a model path to its loaded
//! handle, populating entries under a lock on first use. The orchestrator
//! receives the registry by injection; tests seed it with fakes instead
//! of loading real weights.

use crate::config::ModelSettings;
use crate::error::{OppsumError, Result};
use crate::inference::{CandleTextModel, SpeechModel, TextModel, WhisperSpeechModel};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct ModelRegistry {
    settings: ModelSettings,
    speech: Mutex<HashMap<PathBuf, Arc<dyn SpeechModel>>>,
    text: Mutex<HashMap<PathBuf, Arc<dyn TextModel>>>,
}

impl ModelRegistry {
    pub fn new(settings: ModelSettings) -> Self {
        Self {
            settings,
            speech: Mutex::new(HashMap::new()),
            text: Mutex::new(HashMap::new()),
        }
    }

    /// Get the speech model at `path`, loading it on first use.
    pub fn speech_model(&self, path: &Path) -> Result<Arc<dyn SpeechModel>> {
        let mut models = self
            .speech
            .lock()
            .map_err(|e| OppsumError::ModelInference(format!("registry lock poisoned: {}", e)))?;

        if let Some(model) = models.get(path) {
            return Ok(Arc::clone(model));
        }

        info!("Loading speech model from {}", path.display());
        let model: Arc<dyn SpeechModel> =
            Arc::new(WhisperSpeechModel::load(path, &self.settings)?);
        models.insert(path.to_path_buf(), Arc::clone(&model));
        Ok(model)
    }

    /// Get the text model in directory `path`, loading it on first use.
    pub fn text_model(&self, path: &Path) -> Result<Arc<dyn TextModel>> {
        let mut models = self
            .text
            .lock()
            .map_err(|e| OppsumError::ModelInference(format!("registry lock poisoned: {}", e)))?;

        if let Some(model) = models.get(path) {
            return Ok(Arc::clone(model));
        }

        info!("Loading text model from {}", path.display());
        let model: Arc<dyn TextModel> = Arc::new(CandleTextModel::load(path, &self.settings)?);
        models.insert(path.to_path_buf(), Arc::clone(&model));
        Ok(model)
    }

    /// Seed a speech model under `path` without loading from disk.
    pub fn insert_speech(&self, path: impl Into<PathBuf>, model: Arc<dyn SpeechModel>) {
        if let Ok(mut models) = self.speech.lock() {
            models.insert(path.into(), model);
        }
    }

    /// Seed a text model under `path` without loading from disk.
    pub fn insert_text(&self, path: impl Into<PathBuf>, model: Arc<dyn TextModel>) {
        if let Ok(mut models) = self.text.lock() {
            models.insert(path.into(), model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::GenerationParams;

    struct StubSpeech;

    impl SpeechModel for StubSpeech {
        fn transcribe_window(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
            _params: &GenerationParams,
        ) -> Result<String> {
            Ok("stub".to_string())
        }

        fn name(&self) -> &str {
            "stub-speech"
        }
    }

    struct StubText;

    impl TextModel for StubText {
        fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Ok("stub".to_string())
        }

        fn name(&self) -> &str {
            "stub-text"
        }
    }

    #[test]
    fn test_seeded_model_is_returned() {
        let registry = ModelRegistry::new(ModelSettings::default());
        registry.insert_speech("/models/speech.bin", Arc::new(StubSpeech));

        let model = registry.speech_model(Path::new("/models/speech.bin")).unwrap();
        assert_eq!(model.name(), "stub-speech");
    }

    #[test]
    fn test_same_handle_is_reused() {
        let registry = ModelRegistry::new(ModelSettings::default());
        registry.insert_text("/models/t5", Arc::new(StubText));

        let first = registry.text_model(Path::new("/models/t5")).unwrap();
        let second = registry.text_model(Path::new("/models/t5")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_speech_model_fails() {
        let registry = ModelRegistry::new(ModelSettings::default());
        let result = registry.speech_model(Path::new("/nonexistent/model.bin"));
        assert!(matches!(result, Err(OppsumError::ModelUnavailable(_))));
    }
}
