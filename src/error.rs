//! Error types for Oppsum.

use thiserror::Error;

/// Library-level error type for Oppsum operations.
#[derive(Error, Debug)]
pub enum OppsumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Media decoding failed: {0}")]
    MediaDecode(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Model inference failed: {0}")]
    ModelInference(String),

    #[error("Unable to produce transcript. The audio may be too short, silent, or in an unsupported format.")]
    EmptyTranscript,

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Oppsum operations.
pub type Result<T> = std::result::Result<T, OppsumError>;
