//! Oppsum - Lecture Transcription and Summarization
//!
//! A local-first library and CLI for turning lecture recordings and notes
//! into structured summaries, transcripts and study flashcards.
//!
//! The name comes from the Norwegian "oppsummere," to summarize.
//!
//! # Overview
//!
//! Oppsum allows you to:
//! - Transcribe local audio and video files with a Whisper model
//! - Summarize long texts and transcripts with a local T5 model
//! - Polish the final summary through an optional paraphrase service
//! - Generate study flashcards and export summaries as PDF
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `audio` - Media decoding and normalization
//! - `chunking` - Fixed-size windowing of words and samples
//! - `inference` - Model registry and local model adapters
//! - `transcription` - Speech-to-text over audio windows
//! - `summarization` - Window summaries, filtering and joining
//! - `paraphrase` - Optional external rewriting of the final summary
//! - `flashcards` - Question/answer generation for studying
//! - `export` - PDF and plain-text rendering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use oppsum::config::Settings;
//! use oppsum::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator
//!         .process_media(std::path::Path::new("lecture.mp4"))
//!         .await?;
//!     println!("{}", result.summary.text);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod flashcards;
pub mod inference;
pub mod orchestrator;
pub mod paraphrase;
pub mod summarization;
pub mod transcription;

pub use error::{OppsumError, Result};
