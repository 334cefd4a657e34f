//! CLI module for Oppsum.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Oppsum - Lecture Transcription and Summarization
///
/// A local-first tool for turning lecture recordings and notes into
/// structured summaries and study material. The name comes from the
/// Norwegian "oppsummere," to summarize.
#[derive(Parser, Debug)]
#[command(name = "oppsum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Summarize a text file
    Summarize {
        /// Text file to summarize, or '-' for stdin
        input: String,

        /// Write the summary to a text file
        #[arg(short, long)]
        output: Option<String>,

        /// Export the summary as a PDF
        #[arg(long)]
        pdf: Option<String>,

        /// Skip the external paraphrase step
        #[arg(long)]
        no_paraphrase: bool,
    },

    /// Transcribe an audio or video file
    Transcribe {
        /// Audio/video file path
        input: String,

        /// Also summarize the transcript
        #[arg(short, long)]
        summarize: bool,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate study flashcards from a text file
    Flashcards {
        /// Text file to work from, or '-' for stdin
        input: String,

        /// Questions to generate per section
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },

    /// Start HTTP API server for integration with other frontends
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a default configuration file
    Init,

    /// Show configuration file path
    Path,
}
