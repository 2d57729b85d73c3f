//! Report tables and TSV exports.
//!
//! SYSTEM CONTEXT
//! ==============
//! Report layouts are defined by the backend, so tables are kept as rows of
//! named cells. Exports arrive as TSV blobs and are written to a directory
//! chosen by the operator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::ReportTable;
use crate::services::or_fallback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Report1,
    Report2,
}

impl ReportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report1 => "report1",
            Self::Report2 => "report2",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report1" => Ok(Self::Report1),
            "report2" => Ok(Self::Report2),
            other => Err(format!("unknown report: {other}")),
        }
    }
}

/// A report table; empty on failure.
pub async fn report(client: &ApiClient, kind: ReportKind) -> ReportTable {
    let path = format!("/report/{kind}");
    or_fallback(client.get_json(&path).await, "GET /report/{report}", ReportTable::default)
}

/// A report as a TSV blob.
///
/// # Errors
///
/// Propagates the request error; the caller is saving a file.
pub async fn download(client: &ApiClient, kind: ReportKind) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&format!("/download/{kind}")).await
}

/// `{stem}_{YYYY-MM-DD}.tsv` for today's UTC date.
#[must_use]
pub fn export_filename(stem: &str) -> String {
    let date = time::OffsetDateTime::now_utc().date();
    format!("{stem}_{date}.tsv")
}

/// Write a downloaded blob into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`ApiError::Io`] if the directory or file cannot be written.
pub async fn save_blob(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Io(format!("cannot create {}: {e}", dir.display())))?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Io(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}
