//! Summarization stage: document text in, aggregate summary out.
//!
//! The document is split into fixed-size word windows; each window gets
//! one model call with fixed generation parameters. Windows the model
//! marks insignificant are dropped before the join.

pub mod filter;

use crate::chunking::{window_count, windows_of};
use crate::config::Prompts;
use crate::error::Result;
use crate::inference::{ChunkOutcome, GenerationParams, TextModel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Message returned when a summary is requested for input with no words.
///
/// This substitution happens only for empty input, never for a document
/// whose windows were all judged insignificant; that case yields an empty
/// summary instead.
pub const NO_TEXT_MESSAGE: &str = "No text available to summarize.";

/// Aggregate summary for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Joined summary text.
    pub text: String,
    /// Surviving per-window summaries, in document order.
    pub chunks: Vec<String>,
}

/// Text summarization pipeline stage.
pub struct Summarizer {
    model: Arc<dyn TextModel>,
    window_words: usize,
    prompts: Prompts,
    params: GenerationParams,
}

impl Summarizer {
    pub fn new(model: Arc<dyn TextModel>, window_words: usize, prompts: &Prompts) -> Self {
        Self {
            model,
            window_words,
            prompts: prompts.clone(),
            params: GenerationParams::summarization(),
        }
    }

    /// Summarize a document window by window.
    #[instrument(skip_all, fields(model = self.model.name()))]
    pub fn summarize(&self, text: &str) -> Result<Summary> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Summary {
                text: NO_TEXT_MESSAGE.to_string(),
                chunks: Vec::new(),
            });
        }

        let total = window_count(words.len(), self.window_words);
        let mut outcomes = Vec::with_capacity(total);

        for window in windows_of(&words, self.window_words)? {
            debug!("Summarizing window {}/{}", window.index + 1, total);
            let mut vars = HashMap::new();
            vars.insert("chunk".to_string(), window.elements.join(" "));
            let prompt = self
                .prompts
                .render_with_custom(&self.prompts.summarization.window, &vars);

            let raw = self.model.generate(&prompt, &self.params)?;
            let outcome = ChunkOutcome::from_model_output(&raw);
            if outcome == ChunkOutcome::Insignificant {
                debug!("Window {}/{} marked insignificant", window.index + 1, total);
            }
            outcomes.push(outcome);
        }

        let (summary, chunks) = filter::join_summary(&outcomes);
        info!("Summarized {} windows, {} kept", total, chunks.len());

        Ok(Summary {
            text: summary,
            chunks,
        })
    }
}
