//! Configuration settings for Oppsum.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub models: ModelSettings,
    pub pipeline: PipelineSettings,
    pub paraphrase: ParaphraseSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (models, exports).
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.oppsum".to_string(),
            temp_dir: "/tmp/oppsum".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Compute device selection for local inference.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    /// Use an accelerator when one is available, otherwise the CPU.
    #[default]
    Auto,
    /// Force CPU inference.
    Cpu,
}

impl std::str::FromStr for ComputeDevice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "gpu" => Ok(ComputeDevice::Auto),
            "cpu" => Ok(ComputeDevice::Cpu),
            _ => Err(format!("Unknown compute device: {}", s)),
        }
    }
}

impl std::fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeDevice::Auto => write!(f, "auto"),
            ComputeDevice::Cpu => write!(f, "cpu"),
        }
    }
}

/// Local model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Path to the ggml Whisper model file.
    pub speech_model: String,
    /// Directory holding the quantized T5 model, config and tokenizer.
    pub text_model_dir: String,
    /// Compute device for inference.
    pub device: ComputeDevice,
    /// Spoken language hint for transcription ("auto" to detect).
    pub language: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            speech_model: "~/.oppsum/models/ggml-base.en.bin".to_string(),
            text_model_dir: "~/.oppsum/models/flan-t5-base".to_string(),
            device: ComputeDevice::Auto,
            language: "en".to_string(),
        }
    }
}

/// Pipeline windowing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Words per summarization window.
    pub text_window_words: usize,
    /// Samples per transcription window.
    pub audio_window_samples: usize,
    /// Canonical sample rate for normalized audio.
    pub sample_rate: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            text_window_words: 900,
            audio_window_samples: 50_000,
            sample_rate: 16_000,
        }
    }
}

/// External paraphrase service settings.
///
/// Credentials resolve from the environment first
/// (`OPPSUM_PARAPHRASE_DEV_KEY`, `OPPSUM_PARAPHRASE_API_KEY`), then from
/// this section. With no endpoint or credentials configured the
/// paraphrase step keeps summaries unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParaphraseSettings {
    /// Enable the paraphrase step.
    pub enabled: bool,
    /// Rewriting service endpoint URL.
    pub endpoint: String,
    /// Service dev key (environment variable takes precedence).
    pub dev_key: Option<String>,
    /// Service api key (environment variable takes precedence).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ParaphraseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::new(),
            dev_key: None,
            api_key: None,
            timeout_seconds: 15,
        }
    }
}

impl ParaphraseSettings {
    /// Resolve service credentials, environment first.
    pub fn credentials(&self) -> Option<(String, String)> {
        let dev_key = std::env::var("OPPSUM_PARAPHRASE_DEV_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.dev_key.clone().filter(|v| !v.is_empty()))?;
        let api_key = std::env::var("OPPSUM_PARAPHRASE_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone().filter(|v| !v.is_empty()))?;
        Some((dev_key, api_key))
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::OppsumError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oppsum")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded speech model path.
    pub fn speech_model_path(&self) -> PathBuf {
        Self::expand_path(&self.models.speech_model)
    }

    /// Get the expanded text model directory.
    pub fn text_model_dir(&self) -> PathBuf {
        Self::expand_path(&self.models.text_model_dir)
    }
}
