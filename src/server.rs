//! Webhook HTTP endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/webhook` | Submit a report (raw markdown or a recognized JSON shape) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `200` acknowledges that content was *extracted and queued* — archiving
//! and publishing happen afterwards on a background worker, and their
//! failures are visible only in the log stream. `400` means no content
//! could be extracted and carries a truncated preview of the received body:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "..." }, "preview": "..." }
//! ```
//!
//! Any other path is `404`.
//!
//! # Serialization
//!
//! All accepted submissions flow through a single worker task, one pipeline
//! invocation at a time. Two racing submissions would otherwise both
//! load-modify-write the same manifest and working tree and lose one of the
//! updates.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::payload;
use crate::pipeline;

/// Queued submissions waiting for the worker. Sized far beyond the intended
/// one-report-a-day load; a full queue rejects with 503 rather than block
/// the listener.
const QUEUE_DEPTH: usize = 64;

/// Body preview length attached to 400 responses.
const PREVIEW_CHARS: usize = 200;

#[derive(Clone)]
struct AppState {
    jobs: mpsc::Sender<String>,
}

/// Starts the webhook server. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = app(Arc::new(config.clone()));

    info!("webhook listening on http://{}/webhook", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router and spawns the single-writer pipeline worker.
/// Split out from [`run_server`] so tests can drive it on an ephemeral port.
pub fn app(config: Arc<Config>) -> Router {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    tokio::spawn(run_worker(rx, config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(AppState { jobs: tx })
}

/// Drains the submission queue, running each pipeline invocation to
/// completion before taking the next. Pipeline failures are terminal for
/// that submission: logged, never retried, never surfaced to the submitter.
async fn run_worker(mut rx: mpsc::Receiver<String>, config: Arc<Config>) {
    while let Some(content) = rx.recv().await {
        let cfg = config.clone();
        let result =
            tokio::task::spawn_blocking(move || pipeline::process_report(&cfg, &content)).await;
        match result {
            Ok(Ok(outcome)) => info!(
                category = %outcome.category,
                date = %outcome.date,
                title = %outcome.title,
                published = ?outcome.published,
                "report processed"
            ),
            Ok(Err(e)) => error!("pipeline failed: {:#}", e),
            Err(e) => error!("pipeline task panicked: {}", e),
        }
    }
}

// ============ Error response ============

/// JSON error body: `{"error": {"code", "message"}, "preview": ...}`.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    preview: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
            preview: self.preview,
        };
        (self.status, Json(body)).into_response()
    }
}

/// 400 with a truncated preview of what was actually received — submission
/// shapes vary enough that the preview is the main debugging aid.
fn bad_request(message: impl Into<String>, body_text: &str) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
        preview: Some(truncate_chars(body_text, PREVIEW_CHARS)),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /webhook ============

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw = payload::decode_body(&headers, &body)
        .map_err(|e| bad_request(e.to_string(), &String::from_utf8_lossy(&body)))?;
    let text = String::from_utf8_lossy(&raw).to_string();

    let content =
        payload::extract_content(&text).map_err(|e| bad_request(e.to_string(), &text))?;

    // Acknowledge before processing: "accepted for processing", not
    // "processed successfully".
    if let Err(e) = state.jobs.try_send(content) {
        let message = match e {
            mpsc::error::TrySendError::Full(_) => "submission queue is full",
            mpsc::error::TrySendError::Closed(_) => "pipeline worker is not running",
        };
        return Err(AppError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "unavailable".to_string(),
            message: message.to_string(),
            preview: None,
        });
    }

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn handle_not_found() -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: "no such endpoint (try POST /webhook)".to_string(),
        preview: None,
    }
}
