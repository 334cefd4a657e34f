//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Oppsum Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    let tool_check = check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg());
    tool_check.print();
    checks.push(tool_check);

    println!();

    // Check local models
    println!("{}", style("Models").bold());
    let speech_check = check_speech_model(settings);
    speech_check.print();
    checks.push(speech_check);
    let text_check = check_text_model(settings);
    text_check.print();
    checks.push(text_check);

    println!();

    // Check the optional paraphrase service
    println!("{}", style("Paraphrase Service").bold());
    let paraphrase_check = check_paraphrase(settings);
    paraphrase_check.print();
    checks.push(paraphrase_check);

    println!();

    // Check directories
    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Oppsum.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Oppsum is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check that the Whisper model file is present.
fn check_speech_model(settings: &Settings) -> CheckResult {
    let path = settings.speech_model_path();
    if path.exists() {
        let size = std::fs::metadata(&path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok("Speech model", &format!("{} ({})", path.display(), size))
    } else {
        CheckResult::error(
            "Speech model",
            &format!("{} (not found)", path.display()),
            "Download a ggml Whisper model (e.g. ggml-base.en.bin) and set models.speech_model",
        )
    }
}

/// Check that the T5 model directory has all required files.
fn check_text_model(settings: &Settings) -> CheckResult {
    let dir = settings.text_model_dir();
    if !dir.exists() {
        return CheckResult::error(
            "Text model",
            &format!("{} (not found)", dir.display()),
            "Download a quantized Flan-T5 model and set models.text_model_dir",
        );
    }

    let missing: Vec<&str> = ["model.gguf", "config.json", "tokenizer.json"]
        .into_iter()
        .filter(|file| !dir.join(file).exists())
        .collect();

    if missing.is_empty() {
        CheckResult::ok("Text model", &format!("{}", dir.display()))
    } else {
        CheckResult::error(
            "Text model",
            &format!("{} (missing {})", dir.display(), missing.join(", ")),
            "The model directory must contain model.gguf, config.json and tokenizer.json",
        )
    }
}

/// Check whether the paraphrase service is usable.
fn check_paraphrase(settings: &Settings) -> CheckResult {
    if !settings.paraphrase.enabled {
        return CheckResult::ok("Paraphrase service", "disabled");
    }

    if settings.paraphrase.endpoint.is_empty() {
        return CheckResult::warning(
            "Paraphrase service",
            "no endpoint configured",
            "Set paraphrase.endpoint, or disable with paraphrase.enabled = false",
        );
    }

    match settings.paraphrase.credentials() {
        Some(_) => CheckResult::ok("Paraphrase service", &settings.paraphrase.endpoint),
        None => CheckResult::warning(
            "Paraphrase service",
            "credentials not set (summaries are kept as generated)",
            "Set OPPSUM_PARAPHRASE_DEV_KEY and OPPSUM_PARAPHRASE_API_KEY",
        ),
    }
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    let temp_dir = settings.temp_dir();
    if temp_dir.exists() {
        results.push(CheckResult::ok(
            "Temp directory",
            &format!("{}", temp_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Temp directory",
            &format!("{} (will be created)", temp_dir.display()),
            "Directory will be created on first use",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: oppsum config init",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
