//! CLI command implementations.

mod config;
mod doctor;
mod flashcards;
mod serve;
mod summarize;
mod transcribe;

pub use config::run_config;
pub use doctor::run_doctor;
pub use flashcards::run_flashcards;
pub use serve::run_serve;
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;
