//! Optional external rewrite of the aggregate summary.
//!
//! The paraphrase step is best-effort by contract: it either returns a
//! rewritten text or the original one, never an error. Texts too short or
//! without sentence punctuation are kept without a network call, and the
//! service is only consulted when its endpoint and credentials are
//! configured.

use crate::config::ParaphraseSettings;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Minimum word count before the external service is worth a call.
const MIN_WORDS: usize = 20;

/// Outcome of a paraphrase attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParaphraseOutcome {
    /// The service rewrote the text.
    Rewritten(String),
    /// The original text is kept; `reason` says why.
    Unchanged { text: String, reason: String },
}

impl ParaphraseOutcome {
    /// The text to carry forward either way.
    pub fn into_text(self) -> String {
        match self {
            ParaphraseOutcome::Rewritten(text) => text,
            ParaphraseOutcome::Unchanged { text, .. } => text,
        }
    }
}

/// Envelope returned by the rewriting service.
#[derive(Debug, Deserialize)]
struct RewriteEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    text: Option<String>,
}

pub struct Paraphraser {
    client: Option<reqwest::Client>,
    settings: ParaphraseSettings,
}

impl Paraphraser {
    pub fn new(settings: ParaphraseSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .ok();
        Self { client, settings }
    }

    /// Rewrite `text` through the external service, best-effort.
    #[instrument(skip_all, fields(words = text.split_whitespace().count()))]
    pub async fn paraphrase(&self, text: &str) -> ParaphraseOutcome {
        let unchanged = |reason: &str| ParaphraseOutcome::Unchanged {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        if !self.settings.enabled {
            return unchanged("paraphrasing disabled");
        }

        let Some((dev_key, api_key)) = self.settings.credentials() else {
            return unchanged("service credentials not configured");
        };

        if self.settings.endpoint.trim().is_empty() {
            return unchanged("service endpoint not configured");
        }

        if text.split_whitespace().count() < MIN_WORDS {
            debug!("Text below {} words, keeping original", MIN_WORDS);
            return unchanged("text below minimum length");
        }

        if !text.contains(['.', '?', '!']) {
            return unchanged("no sentence punctuation");
        }

        let Some(client) = &self.client else {
            return unchanged("http client unavailable");
        };

        match self.call_service(client, &dev_key, &api_key, text).await {
            Ok(rewritten) => ParaphraseOutcome::Rewritten(rewritten),
            Err(reason) => {
                warn!("Paraphrase kept original text: {}", reason);
                unchanged(&reason)
            }
        }
    }

    async fn call_service(
        &self,
        client: &reqwest::Client,
        dev_key: &str,
        api_key: &str,
        text: &str,
    ) -> std::result::Result<String, String> {
        let form = [("dev_key", dev_key), ("api_key", api_key), ("text", text)];

        let response = client
            .post(&self.settings.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("service returned HTTP {}", response.status()));
        }

        let envelope: RewriteEnvelope = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;

        if envelope.code != 200 {
            return Err(format!("service reported code {}", envelope.code));
        }

        match envelope.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err("service returned no text".to_string()),
        }
    }
}
