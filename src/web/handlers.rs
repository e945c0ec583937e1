//! Request handlers for the embedded UI and the JSON API.

use crate::archive::{bundle_successful, ARCHIVE_NAME};
use crate::batch::{convert_batch, UploadedFile};
use crate::config::{ConvertConfig, PageSelection};
use crate::formats::{InputFormat, OutputFormat};
use crate::progress::ProgressSnapshot;
use crate::web::{AppState, WebError};
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Characters of converted content echoed back in the batch response.
const PREVIEW_CHARS: usize = 1000;

/// The single embedded UI page.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

// ── GET /api/formats ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FormatEntry {
    group: &'static str,
    label: &'static str,
    extensions: &'static [&'static str],
}

/// Supported input formats, grouped the way the UI's format table shows
/// them (Documents / Images / Audio & Video / Other).
pub async fn formats() -> Json<Vec<FormatEntry>> {
    Json(
        InputFormat::all()
            .iter()
            .map(|f| FormatEntry {
                group: f.group(),
                label: f.label(),
                extensions: f.extensions(),
            })
            .collect(),
    )
}

// ── GET /api/progress ────────────────────────────────────────────────────

/// Snapshot of the shared progress state; the browser polls this while a
/// conversion request is in flight.
pub async fn progress(State(state): State<Arc<AppState>>) -> Json<ProgressSnapshot> {
    Json(state.relay.snapshot())
}

// ── POST /api/convert ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ConvertResponse {
    pub batch_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
    pub results: Vec<FileReport>,
}

#[derive(Serialize)]
pub struct FileReport {
    pub index: usize,
    pub filename: String,
    pub output_name: String,
    pub format: OutputFormat,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Upload + convert, strictly sequential, inside this request.
///
/// Multipart fields: repeated `files`, plus text fields `output_format`,
/// `ocr`, `table_structure`, `extract_images`, `pages`.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, WebError> {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut output = OutputFormat::default();
    let mut ocr = state.defaults.ocr;
    let mut table_structure = state.defaults.table_structure;
    let mut extract_images = state.defaults.extract_images;
    let mut pages = state.defaults.pages;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| WebError::BadRequest("file field without a filename".into()))?;
                let data = field.bytes().await?;
                files.push(UploadedFile::new(filename, data));
            }
            "output_format" => {
                let value = field.text().await?;
                output = OutputFormat::parse(&value).ok_or_else(|| {
                    WebError::BadRequest(format!("unknown output format '{value}'"))
                })?;
            }
            "ocr" => ocr = parse_bool(&field.text().await?, "ocr")?,
            "table_structure" => {
                table_structure = parse_bool(&field.text().await?, "table_structure")?
            }
            "extract_images" => {
                extract_images = parse_bool(&field.text().await?, "extract_images")?
            }
            "pages" => {
                let value = field.text().await?;
                pages = PageSelection::parse(&value).ok_or_else(|| {
                    WebError::BadRequest(format!(
                        "invalid page selection '{value}' (use all, 5, or 3-15)"
                    ))
                })?;
            }
            // Unknown fields are ignored so the UI can evolve ahead of the server.
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(WebError::BadRequest("no files provided".into()));
    }

    let config = ConvertConfig::builder()
        .engine_program(&state.defaults.engine_program)
        .ocr(ocr)
        .table_structure(table_structure)
        .extract_images(extract_images)
        .pages(pages)
        .build()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let batch = convert_batch(
        state.converter.as_ref(),
        &files,
        output,
        &config,
        &state.relay,
    )
    .await;

    let succeeded = batch.succeeded();
    let failed = batch.failed();
    let total_duration_ms = batch.total_duration_ms;
    let total = batch.results.len();

    let batch_id = Uuid::new_v4();
    let results = batch
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| FileReport {
            index: i,
            filename: r.filename.clone(),
            output_name: r.output_name.clone(),
            format: r.format,
            success: r.is_success(),
            duration_ms: r.duration_ms,
            pages: r.pages(),
            preview: r.content().map(preview),
            message: r.failure_message().map(str::to_string),
            download_url: r
                .is_success()
                .then(|| format!("/api/batches/{batch_id}/files/{i}/download")),
        })
        .collect();
    state.store_batch(batch_id, batch);

    Ok(Json(ConvertResponse {
        batch_id,
        total,
        succeeded,
        failed,
        total_duration_ms,
        archive_url: (succeeded > 0).then(|| format!("/api/batches/{batch_id}/archive")),
        results,
    }))
}

// ── GET /api/batches/{id}/files/{index}/download ─────────────────────────

/// Download one converted file with its fixed MIME mapping.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Response, WebError> {
    let batch = state
        .batch(id)
        .ok_or_else(|| WebError::NotFound(format!("unknown batch {id}")))?;
    let result = batch
        .results
        .get(index)
        .ok_or_else(|| WebError::NotFound(format!("batch {id} has no file {index}")))?;
    let content = result.content().ok_or_else(|| {
        WebError::NotFound(format!("file '{}' failed conversion", result.filename))
    })?;

    Ok((
        [
            (CONTENT_TYPE, result.format.mime().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", result.output_name),
            ),
        ],
        content.to_string(),
    )
        .into_response())
}

// ── GET /api/batches/{id}/archive ────────────────────────────────────────

/// Download all successful results as one zip archive.
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let batch = state
        .batch(id)
        .ok_or_else(|| WebError::NotFound(format!("unknown batch {id}")))?;
    let bytes =
        bundle_successful(&batch.results).map_err(|e| WebError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn parse_bool(value: &str, field: &str) -> Result<bool, WebError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(WebError::BadRequest(format!(
            "field '{field}' expects a boolean, got '{other}'"
        ))),
    }
}

/// Truncate to [`PREVIEW_CHARS`] characters on a char boundary.
fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}…", &content[..idx]),
        None => content.to_string(),
    }
}
