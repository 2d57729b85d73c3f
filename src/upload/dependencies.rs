//! Upload ordering rules between datasets.
//!
//! styles and stores stand alone, skus hang off styles, and sales reference
//! all three. The check is pure so views and the CLI gate can share it.

#[cfg(test)]
#[path = "dependencies_test.rs"]
mod tests;

use crate::net::types::{FileType, UploadStatusSnapshot};

/// Outcome of a dependency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCheck {
    pub enabled: bool,
    /// Empty when enabled.
    pub message: String,
}

impl DependencyCheck {
    fn enabled() -> Self {
        Self { enabled: true, message: String::new() }
    }
}

/// Prerequisites of `file_type` that do not exist in `snapshot`, in rule order.
#[must_use]
pub fn missing_prerequisites(file_type: FileType, snapshot: &UploadStatusSnapshot) -> Vec<FileType> {
    file_type
        .prerequisites()
        .iter()
        .copied()
        .filter(|dep| !snapshot.exists(*dep))
        .collect()
}

/// Decide whether `file_type` may be uploaded given the current server status.
#[must_use]
pub fn check_dependencies(file_type: FileType, snapshot: &UploadStatusSnapshot) -> DependencyCheck {
    let missing = missing_prerequisites(file_type, snapshot);
    if missing.is_empty() {
        return DependencyCheck::enabled();
    }
    let message = match file_type {
        FileType::Skus => "Please upload styles before uploading skus".to_owned(),
        _ => {
            let names: Vec<&str> = missing.iter().map(|ft| ft.as_str()).collect();
            format!("Please upload {} before uploading {file_type}", names.join(", "))
        }
    };
    DependencyCheck { enabled: false, message }
}
