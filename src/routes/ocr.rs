//! OCR upload endpoint
//!
//! - POST /ocr - multipart upload (field `file`), image or PDF
//!
//! Request lifecycle: received → validated → staged → processed → responded.
//! The staged upload is removed before the response goes out, whatever the
//! outcome. Validation failures never touch the disk.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::ocr::{is_supported_content_type, DocumentResult, OcrError};
use crate::scratch::suffix_for;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
/// Content type assumed for a part that declares none (RFC 7578)
const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Successful OCR response
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    /// Always 0 on success
    pub code: i32,
    #[serde(flatten)]
    pub result: DocumentResult,
}

/// Create the OCR router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/ocr", post(ocr_upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Map a multipart failure onto the JSON error contract; an exceeded body
/// limit stays a 413.
fn multipart_error(context: &str, status: StatusCode, detail: String) -> ApiError {
    let message = format!("{}: {}", context, detail);
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        multipart_error("Invalid multipart request", rejection.status(), rejection.body_text())
    }
}

fn read_error(context: &str, e: MultipartError) -> ApiError {
    multipart_error(context, e.status(), e.body_text())
}

struct Upload {
    filename: Option<String>,
    content_type: String,
    data: Bytes,
}

/// Pull the `file` part out of the form, rejecting unsupported types before
/// the body is read.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error("Failed to read upload", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_PART_CONTENT_TYPE)
            .to_string();
        if !is_supported_content_type(&content_type) {
            return Err(ApiError::UnsupportedContentType(content_type));
        }

        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| read_error("Failed to read file data", e))?;

        return Ok(Upload {
            filename,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest(
        "No file provided. Use field name 'file'".to_string(),
    ))
}

/// POST /ocr
async fn ocr_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>> {
    let request_id = Uuid::new_v4();
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart).await?;
    let suffix = suffix_for(upload.filename.as_deref(), &upload.content_type);

    tracing::info!(
        %request_id,
        filename = ?upload.filename,
        content_type = %upload.content_type,
        bytes = upload.data.len(),
        "OCR request received"
    );

    let started = Instant::now();
    let scratch = state.scratch().clone();
    let request_scratch = scratch.clone();
    let document_ocr = state.document_ocr().clone();
    let Upload {
        content_type, data, ..
    } = upload;

    let outcome = tokio::task::spawn_blocking(move || -> std::result::Result<DocumentResult, OcrError> {
        let staged = scratch.stage(&data, &suffix)?;
        let result = document_ocr.ocr_file(staged.path(), &content_type);
        staged.cleanup();
        result
    })
    .await
    .map_err(|e| OcrError::Task(e.to_string()))
    .and_then(|result| result);

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::debug!(
        %request_id,
        live_files = request_scratch.live_files(),
        "Scratch files outstanding"
    );
    match outcome {
        Ok(result) => {
            tracing::info!(
                %request_id,
                pages = result.pages.len(),
                items = result.pages.iter().map(|p| p.items.len()).sum::<usize>(),
                elapsed_ms,
                "OCR request completed"
            );
            Ok(Json(OcrResponse { code: 0, result }))
        }
        Err(e) => {
            tracing::warn!(%request_id, elapsed_ms, "OCR request failed: {}", e);
            Err(e.into())
        }
    }
}
