//! Dataset upload, export and diagnostics endpoints.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{FileType, Page, SkippedRow, Task, UploadErrorRecord, UploadStatusSnapshot, ValidationReport};
use crate::services::{PageQuery, or_fallback};
use crate::upload::validate::UploadFile;

const TSV_MIME: &str = "text/tab-separated-values";

/// Outcome of the legacy synchronous upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncUploadResult {
    pub success: bool,
    pub message: String,
    pub records_processed: u64,
}

fn file_part(file: &UploadFile) -> Result<Form, ApiError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(TSV_MIME)?;
    Ok(Form::new().part("file", part))
}

/// Status of every dataset. Falls back to an empty snapshot (nothing exists).
pub async fn status(client: &ApiClient) -> UploadStatusSnapshot {
    or_fallback(client.get_json("/file/status").await, "GET /file/status", UploadStatusSnapshot::default)
}

/// Submit a dataset for asynchronous processing.
///
/// # Errors
///
/// Propagates the request error.
pub async fn upload_async(client: &ApiClient, file_type: FileType, file: &UploadFile) -> Result<Task, ApiError> {
    let path = format!("/file/upload/{file_type}/async");
    client.send_json(client.request(Method::POST, &path).multipart(file_part(file)?)).await
}

/// Upload and process a dataset in a single request.
///
/// # Errors
///
/// Propagates the request error.
#[deprecated(note = "use `upload_async` with the polling engine")]
pub async fn upload_sync(client: &ApiClient, file_type: FileType, file: &UploadFile) -> Result<SyncUploadResult, ApiError> {
    let path = format!("/file/upload/{file_type}");
    client.send_json(client.request(Method::POST, &path).multipart(file_part(file)?)).await
}

/// Ask the server to prepare a TSV export of a dataset.
///
/// # Errors
///
/// Propagates the request error.
pub async fn download_async(client: &ApiClient, file_type: FileType) -> Result<Task, ApiError> {
    client.post_empty(&format!("/file/download/{file_type}/async")).await
}

/// Result blob of a completed task.
///
/// # Errors
///
/// Propagates the request error.
pub async fn task_result(client: &ApiClient, task_id: &str) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&format!("/tasks/{task_id}/result")).await
}

pub async fn upload_errors(client: &ApiClient, task_id: &str, page: u32, size: u32) -> Page<UploadErrorRecord> {
    let path = format!("/upload/errors/{task_id}");
    or_fallback(client.get_json_query(&path, &PageQuery { page, size }).await, "GET /upload/errors/{taskId}", || {
        Page::empty(page, size)
    })
}

pub async fn skipped_rows(client: &ApiClient, task_id: &str, page: u32, size: u32) -> Page<SkippedRow> {
    let path = format!("/upload/errors/{task_id}/skipped");
    or_fallback(
        client.get_json_query(&path, &PageQuery { page, size }).await,
        "GET /upload/errors/{taskId}/skipped",
        || Page::empty(page, size),
    )
}

pub async fn validation_report(client: &ApiClient, task_id: &str) -> ValidationReport {
    let path = format!("/upload/errors/{task_id}/validation-report");
    or_fallback(client.get_json(&path).await, "GET /upload/errors/{taskId}/validation-report", ValidationReport::default)
}

/// Rejected rows of an upload as a TSV blob.
///
/// # Errors
///
/// Propagates the request error; the caller is saving a file.
pub async fn download_errors(client: &ApiClient, task_id: &str) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&format!("/upload/errors/{task_id}/download")).await
}

/// Delete every dataset and result on the server.
///
/// # Errors
///
/// Propagates the request error.
pub async fn clear_all(client: &ApiClient) -> Result<(), ApiError> {
    client.delete("/data/clear-all").await
}
