//! Prompt templates for Oppsum.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub summarization: SummarizationPrompts,
    pub flashcards: FlashcardPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for per-window summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationPrompts {
    /// Task prompt for one window; `{{chunk}}` is the window text.
    pub window: String,
}

impl Default for SummarizationPrompts {
    fn default() -> Self {
        Self {
            // Flan-T5 task prefix. The model answers "0" for windows with
            // nothing worth summarizing.
            window: "summarize: {{chunk}}".to_string(),
        }
    }
}

/// Prompts for flashcard question and answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashcardPrompts {
    pub questions: String,
    pub answer: String,
}

impl Default for FlashcardPrompts {
    fn default() -> Self {
        Self {
            questions: r#"Generate {{count}} important student questions based on the following lecture transcript:

TRANSCRIPT CHUNK:
{{chunk}}

Questions:"#
                .to_string(),

            answer: r#"Answer the following question based on the transcript:

TRANSCRIPT:
{{chunk}}

QUESTION: {{question}}

ANSWER:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summarization_path = custom_path.join("summarization.toml");
            if summarization_path.exists() {
                let content = std::fs::read_to_string(&summarization_path)?;
                prompts.summarization = toml::from_str(&content)?;
            }

            let flashcards_path = custom_path.join("flashcards.toml");
            if flashcards_path.exists() {
                let content = std::fs::read_to_string(&flashcards_path)?;
                prompts.flashcards = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
