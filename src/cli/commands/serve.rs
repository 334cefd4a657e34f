//! HTTP API server for integration with other frontends.
//!
//! Provides REST endpoints for text summarization, media transcription,
//! flashcard generation, and PDF export.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::OppsumError;
use crate::export::{self, SummaryDocument};
use crate::flashcards::Flashcard;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower_http::cors::{Any, CorsLayer};

/// Uploads above this size are rejected outright.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/summarize-text", post(summarize_text))
        .route("/transcribe-and-summarize", post(transcribe_and_summarize))
        .route("/flashcards", post(flashcards))
        .route("/download-pdf", post(download_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Oppsum API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Summarize text", "POST /summarize-text");
    Output::kv("Transcribe media", "POST /transcribe-and-summarize");
    Output::kv("Flashcards", "POST /flashcards");
    Output::kv("Download PDF", "POST /download-pdf");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SummarizeTextRequest {
    text: String,
}

#[derive(Serialize)]
struct SummarizeTextResponse {
    summary: String,
    chunks: Vec<String>,
}

#[derive(Serialize)]
struct TranscribeAndSummarizeResponse {
    transcript: String,
    summary: String,
    chunks: Vec<String>,
}

#[derive(Deserialize)]
struct FlashcardsRequest {
    text: String,
    #[serde(default = "default_num_questions")]
    num_questions: usize,
}

fn default_num_questions() -> usize {
    5
}

#[derive(Serialize)]
struct FlashcardsResponse {
    flashcards: Vec<Flashcard>,
}

#[derive(Deserialize)]
struct DownloadPdfRequest {
    text: String,
    #[serde(default)]
    chunks: Vec<String>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Pipeline failure mapped onto an HTTP response.
///
/// Client-recoverable failures (bad input, undecodable media, missing
/// decode tooling) map to 400; inference-side failures map to 500.
struct ApiError(OppsumError);

impl From<OppsumError> for ApiError {
    fn from(e: OppsumError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OppsumError::Validation(_)
            | OppsumError::MediaDecode(_)
            | OppsumError::ToolNotFound(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "oppsum",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn summarize_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeTextRequest>,
) -> Result<Json<SummarizeTextResponse>, ApiError> {
    let summary = state.orchestrator.summarize_text(&req.text).await?;
    Ok(Json(SummarizeTextResponse {
        summary: summary.text,
        chunks: summary.chunks,
    }))
}

async fn transcribe_and_summarize(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeAndSummarizeResponse>, ApiError> {
    let upload = spool_upload(&mut multipart).await?;
    let result = state.orchestrator.process_media(upload.path()).await?;
    Ok(Json(TranscribeAndSummarizeResponse {
        transcript: result.transcript,
        summary: result.summary.text,
        chunks: result.summary.chunks,
    }))
}

async fn flashcards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FlashcardsRequest>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let cards = state
        .orchestrator
        .generate_flashcards(&req.text, req.num_questions)
        .await?;
    Ok(Json(FlashcardsResponse { flashcards: cards }))
}

async fn download_pdf(Json(req): Json<DownloadPdfRequest>) -> Result<Response, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError(OppsumError::Validation(
            "Summary text must not be empty".to_string(),
        )));
    }

    let document = SummaryDocument {
        title: "Lecture Summary",
        summary: &req.text,
        chunks: &req.chunks,
    };
    let bytes = export::render_pdf(&document)?;
    let filename = export::sanitize_filename(req.filename.as_deref());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Write the uploaded `file` field to a scoped temp file.
///
/// The client extension is kept so WAV uploads can skip re-decoding. The
/// returned handle deletes the file when dropped, on success and failure
/// alike.
async fn spool_upload(multipart: &mut Multipart) -> Result<NamedTempFile, ApiError> {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(ApiError(OppsumError::Validation(
                    "multipart upload must contain a 'file' field".to_string(),
                )))
            }
            Err(e) => {
                return Err(ApiError(OppsumError::Validation(format!(
                    "invalid multipart body: {}",
                    e
                ))))
            }
        }
    };

    let suffix = field
        .file_name()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError(OppsumError::Validation(format!("failed to read upload: {}", e))))?;

    if bytes.is_empty() {
        return Err(ApiError(OppsumError::Validation(
            "Uploaded file is empty".to_string(),
        )));
    }

    let mut file = tempfile::Builder::new()
        .prefix("oppsum-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(OppsumError::Io)
        .map_err(ApiError)?;
    file.write_all(&bytes).map_err(OppsumError::Io).map_err(ApiError)?;
    file.flush().map_err(OppsumError::Io).map_err(ApiError)?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let cases = [
            OppsumError::Validation("empty".to_string()),
            OppsumError::MediaDecode("bad media".to_string()),
            OppsumError::ToolNotFound("ffmpeg".to_string()),
        ];
        for error in cases {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_inference_errors_map_to_500() {
        let cases = [
            OppsumError::ModelUnavailable("missing".to_string()),
            OppsumError::ModelInference("failed".to_string()),
            OppsumError::EmptyTranscript,
        ];
        for error in cases {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_empty_transcript_carries_guidance() {
        let detail = OppsumError::EmptyTranscript.to_string();
        assert!(detail.contains("audio"));
    }
}
