//! Generate study flashcards from a transcript or notes.

use anyhow::Result;
use console::style;

use crate::cli::commands::summarize::read_input;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

pub async fn run_flashcards(input: &str, count: usize, settings: Settings) -> Result<()> {
    let text = read_input(input)?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Generating flashcards...");
    let cards = orchestrator.generate_flashcards(&text, count).await;
    spinner.finish_and_clear();

    let cards = match cards {
        Ok(cards) => cards,
        Err(e) => {
            Output::error(&format!("Flashcard generation failed: {}", e));
            return Err(e.into());
        }
    };

    if cards.is_empty() {
        Output::warning("No flashcards could be generated from this text.");
        return Ok(());
    }

    Output::header(&format!("Flashcards ({})", cards.len()));
    for (i, card) in cards.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, style(&card.question).bold());
        println!("   {}", card.answer);
    }

    Ok(())
}
