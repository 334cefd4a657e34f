//! Oppsum CLI entry point.

use anyhow::Result;
use clap::Parser;
use oppsum::cli::{commands, Cli, Commands};
use oppsum::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("oppsum={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Summarize {
            input,
            output,
            pdf,
            no_paraphrase,
        } => {
            commands::run_summarize(input, output.as_deref(), pdf.as_deref(), *no_paraphrase, settings)
                .await?;
        }

        Commands::Transcribe {
            input,
            summarize,
            output,
        } => {
            commands::run_transcribe(input, *summarize, output.as_deref(), settings).await?;
        }

        Commands::Flashcards { input, count } => {
            commands::run_flashcards(input, *count, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
