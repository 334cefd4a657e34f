//! Summarize a text file into structured notes.

use std::io::Read;
use std::path::Path;

use anyhow::Result;

use crate::cli::Output;
use crate::config::Settings;
use crate::export::{self, SummaryDocument};
use crate::orchestrator::Orchestrator;

pub async fn run_summarize(
    input: &str,
    output: Option<&str>,
    pdf: Option<&str>,
    no_paraphrase: bool,
    mut settings: Settings,
) -> Result<()> {
    let text = read_input(input)?;
    let word_count = text.split_whitespace().count();

    if no_paraphrase {
        settings.paraphrase.enabled = false;
    }

    Output::info(&format!("Summarizing {} words", word_count));

    let orchestrator = Orchestrator::new(settings)?;
    let summary = match orchestrator.summarize_text(&text).await {
        Ok(summary) => summary,
        Err(e) => {
            Output::error(&format!("Summarization failed: {}", e));
            return Err(e.into());
        }
    };

    Output::header("Summary");
    println!("{}", summary.text);
    println!();
    Output::kv("Sections", &summary.chunks.len().to_string());

    let title = document_title(input);
    if let Some(path) = output {
        let document = SummaryDocument {
            title: &title,
            summary: &summary.text,
            chunks: &summary.chunks,
        };
        std::fs::write(path, export::render_text(&document))?;
        Output::success(&format!("Summary saved to {}", path));
    }

    if let Some(path) = pdf {
        let document = SummaryDocument {
            title: &title,
            summary: &summary.text,
            chunks: &summary.chunks,
        };
        export::write_pdf(&document, Path::new(path))?;
        Output::success(&format!("PDF saved to {}", path));
    }

    Ok(())
}

/// Read input from a file, or from stdin when the path is `-`.
pub(super) fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        let path = Path::new(input);
        if !path.exists() {
            anyhow::bail!("file not found: {}", input);
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

fn document_title(input: &str) -> String {
    if input == "-" {
        return "Lecture Summary".to_string();
    }
    Path::new(input)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
        .unwrap_or_else(|| "Lecture Summary".to_string())
}
