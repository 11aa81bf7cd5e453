//! HTTP surface for drivedigest.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Liveness probe returning the service name.
//! - `GET /health` – Credential presence for Drive and the configured summarization provider.
//! - `POST /summarize` – Summarize every matching file in a Drive folder. Accepts
//!   `{ "folder_id": "...", "file_types": ["pdf", "docx", "txt"] }` and returns
//!   `{ "files": [...], "total_files": n }`.
//! - `GET /folders/{folder_id}` – Folder display metadata.
//! - `POST /export/csv`, `POST /export/pdf` – Render a result set (the body of a previous
//!   `/summarize` response) as a downloadable report.
//! - `GET /metrics` – Batch counters since startup.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The server keeps no per-client state: export endpoints render whatever result set the
//! caller sends back.

use crate::drive::{DriveError, FileKind, FolderInfo};
use crate::export::{self, CSV_FILENAME, ExportError, PDF_FILENAME};
use crate::processing::{BatchApi, BatchError, ResultSet};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: BatchApi + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::<S>))
        .route("/summarize", post(summarize_folder::<S>))
        .route("/folders/:folder_id", get(folder_metadata::<S>))
        .route("/export/csv", post(export_csv))
        .route("/export/pdf", post(export_pdf))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Liveness probe.
async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "drivedigest" }))
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    google_drive: bool,
    summarizer: bool,
    provider: String,
}

/// Report whether the Drive token and the provider credentials are configured.
async fn health<S>(State(service): State<Arc<S>>) -> Json<HealthResponse>
where
    S: BatchApi,
{
    let health = service.health();
    Json(HealthResponse {
        status: "healthy",
        google_drive: health.google_drive,
        summarizer: health.summarizer,
        provider: health.provider,
    })
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Drive folder whose direct children are summarized.
    folder_id: String,
    /// Optional type restriction (defaults to all supported types).
    #[serde(default = "default_file_types")]
    file_types: Vec<FileKind>,
}

fn default_file_types() -> Vec<FileKind> {
    FileKind::ALL.to_vec()
}

/// Summarize every matching file in the requested folder.
///
/// Per-file failures come back as `error` rows; only a failed listing fails the request.
async fn summarize_folder<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<ResultSet>, AppError>
where
    S: BatchApi,
{
    let folder_id = request.folder_id.trim();
    if folder_id.is_empty() {
        return Err(AppError::BadRequest("folder_id is required".into()));
    }

    let results = service.run_batch(folder_id, &request.file_types).await?;
    tracing::info!(
        folder = folder_id,
        total = results.total_files,
        succeeded = results.success_count(),
        failed = results.error_count(),
        "Summarize request completed"
    );
    Ok(Json(results))
}

/// Return display metadata for a folder.
async fn folder_metadata<S>(
    State(service): State<Arc<S>>,
    Path(folder_id): Path<String>,
) -> Result<Json<FolderInfo>, AppError>
where
    S: BatchApi,
{
    Ok(Json(service.folder_metadata(&folder_id).await?))
}

/// Render the posted result set as CSV.
async fn export_csv(Json(results): Json<ResultSet>) -> Result<Response, AppError> {
    let bytes = export::render_csv(&results)?;
    Ok(attachment("text/csv", CSV_FILENAME, bytes))
}

/// Render the posted result set as a PDF report stamped with the current time.
async fn export_pdf(Json(results): Json<ResultSet>) -> Result<Response, AppError> {
    let bytes = export::render_pdf(&results, OffsetDateTime::now_utc())?;
    Ok(attachment("application/pdf", PDF_FILENAME, bytes))
}

fn attachment(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Return batch counters accumulated since startup.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: BatchApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        batches_run: snapshot.batches_run,
        files_succeeded: snapshot.files_succeeded,
        files_failed: snapshot.files_failed,
    })
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    batches_run: u64,
    files_succeeded: u64,
    files_failed: u64,
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Download, extract, and summarize every PDF, DOCX, and TXT file in a Drive folder. Response returns { \"files\": [...], \"total_files\": number }.",
                request_example: Some(json!({
                    "folder_id": "1AbCdEfGhIjKlMnOp",
                    "file_types": ["pdf", "docx", "txt"]
                })),
            },
            CommandDescriptor {
                name: "folder",
                method: "GET",
                path: "/folders/{folder_id}",
                description: "Return the folder's name, media type, and creation time.",
                request_example: None,
            },
            CommandDescriptor {
                name: "export_csv",
                method: "POST",
                path: "/export/csv",
                description: "Render a result set from /summarize as a CSV attachment.",
                request_example: Some(json!({
                    "files": [{
                        "name": "report.pdf",
                        "type": "application/pdf",
                        "size": "2048",
                        "summary": "Quarterly revenue grew 12%.",
                        "status": "success"
                    }],
                    "total_files": 1
                })),
            },
            CommandDescriptor {
                name: "export_pdf",
                method: "POST",
                path: "/export/pdf",
                description: "Render a result set from /summarize as a paginated PDF report.",
                request_example: None,
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Report whether Drive and summarization credentials are configured.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return batch counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

/// Errors surfaced by HTTP handlers.
enum AppError {
    BadRequest(String),
    Batch(BatchError),
    Export(ExportError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Batch(BatchError::Listing(DriveError::NotFound(_)))
            | Self::Batch(BatchError::Metadata(DriveError::NotFound(_))) => StatusCode::NOT_FOUND,
            Self::Batch(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Batch(error) => error.to_string(),
            Self::Export(error) => error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            tracing::error!(%status, detail = %detail, "Request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<BatchError> for AppError {
    fn from(inner: BatchError) -> Self {
        Self::Batch(inner)
    }
}

impl From<ExportError> for AppError {
    fn from(inner: ExportError) -> Self {
        Self::Export(inner)
    }
}
