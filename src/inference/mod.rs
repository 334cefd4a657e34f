//! Model adapters for the two inference stages.
//!
//! Both stages share one shape: hand the model a single window of input
//! with fixed generation parameters, get decoded text back. [`SpeechModel`]
//! covers speech-to-text (whisper.cpp via whisper-rs), [`TextModel`] covers
//! text-to-text (quantized T5 via candle). The pipeline only sees the
//! traits, so tests run against fakes seeded into the [`ModelRegistry`].

mod registry;
mod t5;
mod whisper;

pub use registry::ModelRegistry;
pub use t5::CandleTextModel;
pub use whisper::WhisperSpeechModel;

use crate::error::Result;

/// Generation parameters applied to every window of a stage.
///
/// The values are fixed per stage; decoding is deterministic under a fixed
/// set (beam search or greedy, never sampling), so re-running a job yields
/// identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Maximum number of new tokens to generate.
    pub max_new_tokens: usize,
    /// Minimum number of new tokens before the end token is accepted.
    pub min_new_tokens: usize,
    /// Beam count; 1 means greedy decoding.
    pub beam_count: usize,
    /// Length penalty applied during beam scoring.
    pub length_penalty: f32,
    /// Stop decoding as soon as the end token is produced.
    pub early_stopping: bool,
}

impl GenerationParams {
    /// Parameters for per-window summarization.
    pub fn summarization() -> Self {
        Self {
            max_new_tokens: 256,
            min_new_tokens: 100,
            beam_count: 4,
            length_penalty: 2.0,
            early_stopping: true,
        }
    }

    /// Parameters for per-window transcription.
    pub fn transcription() -> Self {
        Self {
            max_new_tokens: 400,
            min_new_tokens: 0,
            beam_count: 1,
            length_penalty: 1.0,
            early_stopping: true,
        }
    }

    /// Parameters for flashcard question/answer generation.
    pub fn flashcards() -> Self {
        Self {
            max_new_tokens: 256,
            min_new_tokens: 0,
            beam_count: 4,
            length_penalty: 1.0,
            early_stopping: true,
        }
    }
}

/// Outcome of one summarization window.
///
/// The summarization model signals "nothing worth keeping here" by
/// emitting the bare token `0`. The adapter converts that into an explicit
/// variant so the join step pattern-matches instead of comparing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The window produced usable summary text.
    Significant(String),
    /// The window contributed nothing of note and is excluded from joins.
    Insignificant,
}

impl ChunkOutcome {
    /// Classify raw model output for one window.
    pub fn from_model_output(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "0" {
            ChunkOutcome::Insignificant
        } else {
            ChunkOutcome::Significant(trimmed.to_string())
        }
    }

    /// Text of a significant outcome, if any.
    pub fn significant_text(&self) -> Option<&str> {
        match self {
            ChunkOutcome::Significant(text) => Some(text),
            ChunkOutcome::Insignificant => None,
        }
    }
}

/// Speech-to-text backend: one window of mono samples in, decoded text out.
///
/// Implementations load their weights once and are reused across windows
/// and requests; they must serialize access to the underlying runtime
/// themselves (generation on one handle is not assumed concurrency-safe).
pub trait SpeechModel: Send + Sync {
    /// Transcribe one window of samples at the given rate.
    fn transcribe_window(
        &self,
        samples: &[f32],
        sample_rate: u32,
        params: &GenerationParams,
    ) -> Result<String>;

    /// Short model name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// Text-to-text backend: one prompt in, decoded text out with special
/// tokens stripped.
pub trait TextModel: Send + Sync {
    /// Run one generation call over the prompt.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Short model name for logs and diagnostics.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_output_is_insignificant() {
        assert_eq!(ChunkOutcome::from_model_output("0"), ChunkOutcome::Insignificant);
        assert_eq!(ChunkOutcome::from_model_output("  0  "), ChunkOutcome::Insignificant);
        assert_eq!(ChunkOutcome::from_model_output("0\n"), ChunkOutcome::Insignificant);
    }

    #[test]
    fn test_ordinary_output_is_significant() {
        assert_eq!(
            ChunkOutcome::from_model_output("  The lecture covers sorting.  "),
            ChunkOutcome::Significant("The lecture covers sorting.".to_string())
        );
        // Only the exact sentinel is filtered.
        assert_eq!(
            ChunkOutcome::from_model_output("0."),
            ChunkOutcome::Significant("0.".to_string())
        );
    }

    #[test]
    fn test_significant_text_accessor() {
        let significant = ChunkOutcome::Significant("text".to_string());
        assert_eq!(significant.significant_text(), Some("text"));
        assert_eq!(ChunkOutcome::Insignificant.significant_text(), None);
    }

    #[test]
    fn test_stage_parameters() {
        let summary = GenerationParams::summarization();
        assert_eq!(summary.max_new_tokens, 256);
        assert_eq!(summary.min_new_tokens, 100);
        assert_eq!(summary.beam_count, 4);
        assert!(summary.early_stopping);

        let speech = GenerationParams::transcription();
        assert_eq!(speech.max_new_tokens, 400);
        assert_eq!(speech.beam_count, 1);
    }
}
