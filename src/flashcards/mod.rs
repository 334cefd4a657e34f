//! Flashcard generation from lecture text.
//!
//! Works over the same word windows as summarization: one model call per
//! window asks for questions, then each question gets its own answer call
//! grounded in the window it came from.

use crate::chunking::windows_of;
use crate::config::Prompts;
use crate::error::Result;
use crate::inference::{GenerationParams, TextModel};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One question/answer study card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

pub struct FlashcardGenerator {
    model: Arc<dyn TextModel>,
    window_words: usize,
    prompts: Prompts,
    params: GenerationParams,
}

impl FlashcardGenerator {
    pub fn new(model: Arc<dyn TextModel>, window_words: usize, prompts: &Prompts) -> Self {
        Self {
            model,
            window_words,
            prompts: prompts.clone(),
            params: GenerationParams::flashcards(),
        }
    }

    /// Generate up to `count` cards per window of the source text.
    #[instrument(skip_all, fields(model = self.model.name(), count))]
    pub fn generate(&self, text: &str, count: usize) -> Result<Vec<Flashcard>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() || count == 0 {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for window in windows_of(&words, self.window_words)? {
            let chunk = window.elements.join(" ");
            let questions = self.questions_for(&chunk, count)?;
            if questions.is_empty() {
                debug!("Window {} yielded no questions", window.index + 1);
                continue;
            }

            for question in questions {
                let answer = self.answer_for(&chunk, &question)?;
                if answer.trim().is_empty() {
                    continue;
                }
                cards.push(Flashcard {
                    question,
                    answer: answer.trim().to_string(),
                });
            }
        }

        Ok(cards)
    }

    fn questions_for(&self, chunk: &str, count: usize) -> Result<Vec<String>> {
        let mut vars = HashMap::new();
        vars.insert("count".to_string(), count.to_string());
        vars.insert("chunk".to_string(), chunk.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.flashcards.questions, &vars);

        let raw = self.model.generate(&prompt, &self.params)?;
        Ok(parse_question_lines(&raw, count))
    }

    fn answer_for(&self, chunk: &str, question: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("chunk".to_string(), chunk.to_string());
        vars.insert("question".to_string(), question.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.flashcards.answer, &vars);

        self.model.generate(&prompt, &self.params)
    }
}

/// Split model output into clean question lines, dropping list markers.
fn parse_question_lines(raw: &str, limit: usize) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['.', ')', '-', '*'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}
