//! Transcribe command implementation.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::content_preview;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &str,
    summarize: bool,
    output: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let path = Path::new(input);
    if !path.exists() {
        Output::error(&format!("File not found: {}", input));
        return Err(anyhow::anyhow!("file not found: {}", input));
    }

    Output::info(&format!("Processing: {}", input));
    let orchestrator = Orchestrator::new(settings)?;

    if summarize {
        let result = match orchestrator.process_media(path).await {
            Ok(result) => result,
            Err(e) => {
                Output::error(&format!("Failed to process: {}", e));
                return Err(e.into());
            }
        };

        Output::header("Transcript");
        println!("{}", result.transcript);
        Output::header("Summary");
        println!("{}", result.summary.text);
        println!();
        Output::kv("Sections", &result.summary.chunks.len().to_string());

        if let Some(output_path) = output {
            std::fs::write(
                output_path,
                render_report(&result.transcript, &result.summary.text),
            )?;
            Output::success(&format!("Transcript and summary saved to {}", output_path));
        }

        return Ok(());
    }

    let transcript = match orchestrator.transcribe_media(path).await {
        Ok(transcript) => transcript,
        Err(e) => {
            Output::error(&format!("Failed to transcribe: {}", e));
            return Err(e.into());
        }
    };

    match output {
        Some(output_path) if output_path != "-" => {
            std::fs::write(output_path, &transcript.text)?;
            Output::success(&format!(
                "Transcript saved to {} ({} windows)",
                output_path, transcript.window_count
            ));
            Output::kv("Preview", &content_preview(&transcript.text, 160));
        }
        _ => println!("{}", transcript.text),
    }

    Ok(())
}

fn render_report(transcript: &str, summary: &str) -> String {
    format!(
        "Transcript\n----------\n{}\n\nSummary\n-------\n{}\n",
        transcript, summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_report_sections() {
        let report = render_report("hello world", "short notes");
        assert!(report.starts_with("Transcript\n----------\nhello world"));
        assert!(report.contains("\nSummary\n-------\nshort notes\n"));
    }
}
