//! Pipeline orchestrator for Oppsum.
//!
//! Coordinates the full process from uploaded media or pasted text to a
//! polished summary: normalize, window, run the models, filter, join, and
//! optionally paraphrase.

use crate::audio::normalize_media;
use crate::config::{Prompts, Settings};
use crate::error::{OppsumError, Result};
use crate::flashcards::{Flashcard, FlashcardGenerator};
use crate::inference::ModelRegistry;
use crate::paraphrase::{ParaphraseOutcome, Paraphraser};
use crate::summarization::{Summarizer, Summary};
use crate::transcription::{Transcriber, Transcript};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Oppsum pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    registry: Arc<ModelRegistry>,
    paraphraser: Paraphraser,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let registry = Arc::new(ModelRegistry::new(settings.models.clone()));
        let paraphraser = Paraphraser::new(settings.paraphrase.clone());

        std::fs::create_dir_all(settings.temp_dir())?;

        Ok(Self {
            settings,
            prompts,
            registry,
            paraphraser,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        registry: Arc<ModelRegistry>,
        paraphraser: Paraphraser,
    ) -> Result<Self> {
        std::fs::create_dir_all(settings.temp_dir())?;

        Ok(Self {
            settings,
            prompts,
            registry,
            paraphraser,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the shared model registry.
    pub fn registry(&self) -> Arc<ModelRegistry> {
        self.registry.clone()
    }

    /// Summarize pasted or transcribed text.
    ///
    /// Fails with a validation error for empty input; an input whose
    /// windows were all judged insignificant still succeeds with an empty
    /// summary.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn summarize_text(&self, text: &str) -> Result<Summary> {
        if text.trim().is_empty() {
            return Err(OppsumError::Validation(
                "Input text must not be empty".to_string(),
            ));
        }

        info!("Summarizing {} chars of text", text.len());
        eprintln!("  Summarizing...");
        let summarizer = self.summarizer()?;
        let owned = text.to_string();
        let summary = tokio::task::spawn_blocking(move || summarizer.summarize(&owned))
            .await
            .map_err(|e| OppsumError::ModelInference(format!("summarization task failed: {}", e)))??;
        eprintln!("  Summary ready ({} chunks)", summary.chunks.len());

        let polished = match self.paraphraser.paraphrase(&summary.text).await {
            ParaphraseOutcome::Rewritten(text) => {
                info!("Summary rewritten by the paraphrase service");
                eprintln!("  Paraphrased.");
                text
            }
            ParaphraseOutcome::Unchanged { text, reason } => {
                info!("Keeping original summary: {}", reason);
                text
            }
        };

        Ok(Summary {
            text: polished,
            chunks: summary.chunks,
        })
    }

    /// Transcribe a media file without summarizing it.
    ///
    /// A transcript that comes back empty is an error distinct from input
    /// validation failures, since the upload itself was well-formed.
    #[instrument(skip(self), fields(file = %path.display()))]
    pub async fn transcribe_media(&self, path: &Path) -> Result<Transcript> {
        eprintln!("  Normalizing media...");
        let waveform = normalize_media(path, self.settings.pipeline.sample_rate).await?;
        info!(
            "Normalized to {:.1}s at {} Hz",
            waveform.duration_seconds(),
            waveform.sample_rate
        );

        eprintln!("  Transcribing...");
        let transcriber = self.transcriber()?;
        let transcript = tokio::task::spawn_blocking(move || transcriber.transcribe(&waveform))
            .await
            .map_err(|e| OppsumError::ModelInference(format!("transcription task failed: {}", e)))??;
        eprintln!("  Transcription complete ({} windows)", transcript.window_count);

        if transcript.is_empty() {
            return Err(OppsumError::EmptyTranscript);
        }

        Ok(transcript)
    }

    /// Transcribe a media file and summarize the transcript.
    #[instrument(skip(self), fields(file = %path.display()))]
    pub async fn process_media(&self, path: &Path) -> Result<MediaResult> {
        let transcript = self.transcribe_media(path).await?;
        let summary = self.summarize_text(&transcript.text).await?;

        Ok(MediaResult {
            transcript: transcript.text,
            summary,
        })
    }

    /// Generate study flashcards from text.
    #[instrument(skip(self, text), fields(chars = text.len(), count))]
    pub async fn generate_flashcards(&self, text: &str, count: usize) -> Result<Vec<Flashcard>> {
        if text.trim().is_empty() {
            return Err(OppsumError::Validation(
                "Input text must not be empty".to_string(),
            ));
        }

        info!("Generating up to {} flashcards per window", count);
        let generator = self.flashcard_generator()?;
        let owned = text.to_string();
        tokio::task::spawn_blocking(move || generator.generate(&owned, count))
            .await
            .map_err(|e| OppsumError::ModelInference(format!("flashcard task failed: {}", e)))?
    }

    fn summarizer(&self) -> Result<Summarizer> {
        let model = self.registry.text_model(&self.settings.text_model_dir())?;
        Ok(Summarizer::new(
            model,
            self.settings.pipeline.text_window_words,
            &self.prompts,
        ))
    }

    fn transcriber(&self) -> Result<Transcriber> {
        let model = self.registry.speech_model(&self.settings.speech_model_path())?;
        Ok(Transcriber::new(
            model,
            self.settings.pipeline.audio_window_samples,
        ))
    }

    fn flashcard_generator(&self) -> Result<FlashcardGenerator> {
        let model = self.registry.text_model(&self.settings.text_model_dir())?;
        Ok(FlashcardGenerator::new(
            model,
            self.settings.pipeline.text_window_words,
            &self.prompts,
        ))
    }
}

/// Result of processing one media file.
#[derive(Debug)]
pub struct MediaResult {
    /// Full transcript of the media.
    pub transcript: String,
    /// Aggregate summary of the transcript.
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::inference::{GenerationParams, SpeechModel, TextModel};

    struct EchoTextModel;

    impl TextModel for EchoTextModel {
        fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
            if prompt.contains("skipworthy") {
                Ok("0".to_string())
            } else {
                Ok(format!("notes on {} words.", prompt.split_whitespace().count()))
            }
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct FixedSpeechModel(&'static str);

    impl SpeechModel for FixedSpeechModel {
        fn transcribe_window(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
            _params: &GenerationParams,
        ) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.models.speech_model = "/fake/models/speech.bin".to_string();
        settings.models.text_model_dir = "/fake/models/t5".to_string();
        settings.pipeline.text_window_words = 5;
        settings.pipeline.audio_window_samples = 8_000;
        settings
    }

    fn orchestrator_with(
        settings: Settings,
        speech: Option<Arc<dyn SpeechModel>>,
        text: Option<Arc<dyn TextModel>>,
    ) -> Orchestrator {
        let registry = Arc::new(ModelRegistry::new(ModelSettings::default()));
        if let Some(model) = speech {
            registry.insert_speech(settings.speech_model_path(), model);
        }
        if let Some(model) = text {
            registry.insert_text(settings.text_model_dir(), model);
        }
        let paraphraser = Paraphraser::new(settings.paraphrase.clone());
        Orchestrator::with_components(settings, Prompts::default(), registry, paraphraser).unwrap()
    }

    fn write_wav(dir: &std::path::Path, seconds: f32) -> std::path::PathBuf {
        let path = dir.join("lecture.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..((16_000.0 * seconds) as usize) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_any_model_call() {
        let orchestrator = orchestrator_with(test_settings(), None, None);
        let result = orchestrator.summarize_text("   \n  ").await;
        assert!(matches!(result, Err(OppsumError::Validation(_))));
    }

    #[tokio::test]
    async fn test_text_job_windows_and_joins() {
        let orchestrator =
            orchestrator_with(test_settings(), None, Some(Arc::new(EchoTextModel)));

        // Twelve words with window size five: windows of 5, 5 and 2 words.
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let summary = orchestrator.summarize_text(text).await.unwrap();

        assert_eq!(summary.chunks.len(), 3);
        assert_eq!(summary.chunks[0], "notes on 6 words.");
        assert!(summary.text.contains("notes on"));
    }

    #[tokio::test]
    async fn test_insignificant_windows_are_filtered() {
        let orchestrator =
            orchestrator_with(test_settings(), None, Some(Arc::new(EchoTextModel)));

        let text = "alpha beta gamma delta epsilon skipworthy skipworthy skipworthy skipworthy skipworthy";
        let summary = orchestrator.summarize_text(text).await.unwrap();

        assert_eq!(summary.chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_silent_media_reports_empty_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let wav = write_wav(dir.path(), 2.0);

        let orchestrator = orchestrator_with(
            test_settings(),
            Some(Arc::new(FixedSpeechModel(""))),
            Some(Arc::new(EchoTextModel)),
        );

        let result = orchestrator.process_media(&wav).await;
        assert!(matches!(result, Err(OppsumError::EmptyTranscript)));
    }

    #[tokio::test]
    async fn test_media_job_flows_into_summary() {
        let dir = tempfile::tempdir().unwrap();
        let wav = write_wav(dir.path(), 1.5);

        let orchestrator = orchestrator_with(
            test_settings(),
            Some(Arc::new(FixedSpeechModel("the lecture text"))),
            Some(Arc::new(EchoTextModel)),
        );

        let result = orchestrator.process_media(&wav).await.unwrap();
        // 24000 samples in windows of 8000: three windows, space-joined.
        assert_eq!(result.transcript, "the lecture text the lecture text the lecture text");
        assert!(!result.summary.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_transcribe_only_keeps_window_count() {
        let dir = tempfile::tempdir().unwrap();
        let wav = write_wav(dir.path(), 1.5);

        let orchestrator = orchestrator_with(
            test_settings(),
            Some(Arc::new(FixedSpeechModel("hello"))),
            None,
        );

        let transcript = orchestrator.transcribe_media(&wav).await.unwrap();
        assert_eq!(transcript.window_count, 3);
        assert_eq!(transcript.text, "hello hello hello");
    }

    #[tokio::test]
    async fn test_flashcards_require_text() {
        let orchestrator = orchestrator_with(test_settings(), None, None);
        let result = orchestrator.generate_flashcards("", 3).await;
        assert!(matches!(result, Err(OppsumError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_model_surfaces_as_unavailable() {
        // Registry has no seeded models and the paths do not exist.
        let orchestrator = orchestrator_with(test_settings(), None, None);
        let result = orchestrator.summarize_text("plenty of words to pass validation").await;
        assert!(matches!(result, Err(OppsumError::ModelUnavailable(_))));
    }
}
