//! Local upload checks that run before anything is sent.

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;

use std::path::Path;

use crate::config::DEFAULT_MAX_UPLOAD_MB;
use crate::error::ApiError;

/// Extensions the backend parses as tab-separated data.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".tsv", ".txt"];

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = DEFAULT_MAX_UPLOAD_MB * 1024 * 1024;

/// A file ready to be submitted: its name and full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Read a file from disk, keeping only its file name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::Validation(format!("not a file: {}", path.display())))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(format!("cannot read {}: {e}", path.display())))?;
        Ok(Self { name, bytes })
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Check presence, extension and size of a file.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when no file is given, the extension is
/// not in [`ALLOWED_EXTENSIONS`], or the size exceeds `max_bytes`.
pub fn validate_upload(file: Option<&UploadFile>, max_bytes: u64) -> Result<&UploadFile, ApiError> {
    let Some(file) = file else {
        return Err(ApiError::Validation("no file selected".to_owned()));
    };
    validate_name(&file.name)?;
    validate_size(file.size(), max_bytes)?;
    Ok(file)
}

pub(crate) fn validate_name(name: &str) -> Result<(), ApiError> {
    let lower = name.to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "invalid file type for '{name}': expected one of {}",
        ALLOWED_EXTENSIONS.join(", ")
    )))
}

pub(crate) fn validate_size(size: u64, max_bytes: u64) -> Result<(), ApiError> {
    if size <= max_bytes {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "file too large: {} exceeds the {} limit",
        format_size(size),
        format_size(max_bytes)
    )))
}

/// Human-readable byte size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{size} B") } else { format!("{value:.2} {}", UNITS[unit]) }
}
