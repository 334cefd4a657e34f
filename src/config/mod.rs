//! Configuration module for Oppsum.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FlashcardPrompts, Prompts, SummarizationPrompts};
pub use settings::{
    ComputeDevice, GeneralSettings, ModelSettings, ParaphraseSettings, PipelineSettings,
    PromptSettings, Settings,
};
