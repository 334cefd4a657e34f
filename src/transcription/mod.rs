//! Transcription stage: canonical waveform in, transcript text out.
//!
//! The waveform is split into fixed-size sample windows and each window is
//! transcribed with one model call, in order. Window texts are joined with
//! single spaces; deciding whether the result is usable is the caller's
//! job.

use crate::audio::Waveform;
use crate::chunking::{window_count, windows_of};
use crate::error::Result;
use crate::inference::{GenerationParams, SpeechModel};
use crate::summarization::filter::join_transcript;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Transcript produced from one media file.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Window texts joined in order with single spaces, trimmed.
    pub text: String,
    /// Number of audio windows transcribed.
    pub window_count: usize,
}

impl Transcript {
    /// Whether transcription produced any usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Speech-to-text pipeline stage.
pub struct Transcriber {
    model: Arc<dyn SpeechModel>,
    window_samples: usize,
    params: GenerationParams,
}

impl Transcriber {
    pub fn new(model: Arc<dyn SpeechModel>, window_samples: usize) -> Self {
        Self {
            model,
            window_samples,
            params: GenerationParams::transcription(),
        }
    }

    /// Transcribe a waveform window by window.
    #[instrument(skip_all, fields(samples = waveform.len(), model = self.model.name()))]
    pub fn transcribe(&self, waveform: &Waveform) -> Result<Transcript> {
        let total = window_count(waveform.len(), self.window_samples);
        let mut texts: Vec<String> = Vec::with_capacity(total);

        for window in windows_of(&waveform.samples, self.window_samples)? {
            debug!("Transcribing window {}/{}", window.index + 1, total);
            let text =
                self.model
                    .transcribe_window(window.elements, waveform.sample_rate, &self.params)?;
            texts.push(text);
        }

        let text = join_transcript(&texts);
        info!("Transcribed {} windows into {} chars", total, text.len());

        Ok(Transcript {
            text,
            window_count: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels each window by its call order so joins and ordering are
    /// observable.
    struct LabelingModel {
        calls: AtomicUsize,
    }

    impl LabelingModel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SpeechModel for LabelingModel {
        fn transcribe_window(
            &self,
            samples: &[f32],
            _sample_rate: u32,
            _params: &GenerationParams,
        ) -> Result<String> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("w{}:{}", index, samples.len()))
        }

        fn name(&self) -> &str {
            "labeling"
        }
    }

    struct SilentModel;

    impl SpeechModel for SilentModel {
        fn transcribe_window(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
            _params: &GenerationParams,
        ) -> Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    fn waveform(samples: usize) -> Waveform {
        Waveform {
            samples: vec![0.0; samples],
            sample_rate: 16_000,
        }
    }

    #[test]
    fn test_windows_are_transcribed_in_order() {
        let transcriber = Transcriber::new(Arc::new(LabelingModel::new()), 100);
        let transcript = transcriber.transcribe(&waveform(250)).unwrap();

        assert_eq!(transcript.window_count, 3);
        assert_eq!(transcript.text, "w0:100 w1:100 w2:50");
    }

    #[test]
    fn test_exact_multiple_has_no_tail_window() {
        let transcriber = Transcriber::new(Arc::new(LabelingModel::new()), 100);
        let transcript = transcriber.transcribe(&waveform(200)).unwrap();

        assert_eq!(transcript.window_count, 2);
        assert_eq!(transcript.text, "w0:100 w1:100");
    }

    #[test]
    fn test_silent_windows_yield_empty_transcript() {
        let transcriber = Transcriber::new(Arc::new(SilentModel), 100);
        let transcript = transcriber.transcribe(&waveform(300)).unwrap();

        assert_eq!(transcript.window_count, 3);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_empty_waveform_yields_empty_transcript() {
        let transcriber = Transcriber::new(Arc::new(LabelingModel::new()), 100);
        let transcript = transcriber.transcribe(&waveform(0)).unwrap();

        assert_eq!(transcript.window_count, 0);
        assert!(transcript.is_empty());
    }
}
