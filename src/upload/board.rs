//! Per-dataset upload view-model.
//!
//! DESIGN
//! ======
//! `UploadBoard` holds the latest status snapshot in a `watch` channel.
//! Server refreshes replace it wholesale; while a poll is active the board
//! patches the one dataset being uploaded, and each patch still publishes a
//! fresh snapshot value. Views are derived on read and never stored.

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::net::types::{FileStatusRecord, FileType, UploadStatusSnapshot};
use crate::upload::dependencies::check_dependencies;
use crate::upload::poller::ProgressEvent;

/// Local status tag of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Processing,
    Success,
    Error,
    /// Prerequisite datasets are missing.
    Blocked,
}

impl FileState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
            Self::Blocked => "blocked",
        }
    }
}

/// What the upload screen shows for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FileView {
    pub file_type: FileType,
    pub state: FileState,
    pub can_upload: bool,
    /// Dependency message when blocked, otherwise empty.
    pub message: String,
    pub record: FileStatusRecord,
}

/// Derive the view of `file_type` from a snapshot.
#[must_use]
pub fn file_view(file_type: FileType, snapshot: &UploadStatusSnapshot) -> FileView {
    let record = snapshot.get(file_type).cloned().unwrap_or_default();
    let deps = check_dependencies(file_type, snapshot);
    let state = if !deps.enabled {
        FileState::Blocked
    } else if record.processing {
        FileState::Processing
    } else if record.failed {
        FileState::Error
    } else if record.exists {
        FileState::Success
    } else {
        FileState::Pending
    };
    FileView { file_type, state, can_upload: deps.enabled && !record.processing, message: deps.message, record }
}

/// Views for every dataset in display order.
#[must_use]
pub fn file_views(snapshot: &UploadStatusSnapshot) -> Vec<FileView> {
    FileType::ALL.iter().map(|ft| file_view(*ft, snapshot)).collect()
}

/// Snapshot with `file_type` patched from a progress event.
#[must_use]
pub fn with_progress(snapshot: &UploadStatusSnapshot, file_type: FileType, event: &ProgressEvent) -> UploadStatusSnapshot {
    let mut next = snapshot.clone();
    let record = next.files.entry(file_type).or_default();
    record.progress_percentage = f64::from(event.progress);
    if let Some(task) = &event.task {
        record.task_id = Some(task.id.clone());
        record.progress_message.clone_from(&task.progress_message);
    }
    if event.completed {
        record.processing = false;
        record.failed = false;
        record.exists = true;
        record.error_summary = None;
    } else {
        record.processing = true;
    }
    next
}

/// Snapshot with `file_type` marked failed.
#[must_use]
pub fn with_failure(snapshot: &UploadStatusSnapshot, file_type: FileType, error: &ApiError) -> UploadStatusSnapshot {
    let mut next = snapshot.clone();
    let record = next.files.entry(file_type).or_default();
    record.processing = false;
    record.failed = true;
    record.error_summary = Some(error.to_string());
    if let Some(task) = error.task() {
        record.task_id = Some(task.id.clone());
    }
    next
}

/// Observable holder of the current upload status snapshot.
pub struct UploadBoard {
    snapshot: watch::Sender<UploadStatusSnapshot>,
}

impl Default for UploadBoard {
    fn default() -> Self {
        Self::new(UploadStatusSnapshot::default())
    }
}

impl UploadBoard {
    #[must_use]
    pub fn new(initial: UploadStatusSnapshot) -> Self {
        let (snapshot, _) = watch::channel(initial);
        Self { snapshot }
    }

    #[must_use]
    pub fn snapshot(&self) -> UploadStatusSnapshot {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UploadStatusSnapshot> {
        self.snapshot.subscribe()
    }

    /// Replace the snapshot with a fresh server copy.
    pub fn replace(&self, snapshot: UploadStatusSnapshot) {
        self.snapshot.send_replace(snapshot);
    }

    pub fn apply_progress(&self, file_type: FileType, event: &ProgressEvent) {
        let next = with_progress(&self.snapshot.borrow(), file_type, event);
        self.snapshot.send_replace(next);
    }

    pub fn apply_failure(&self, file_type: FileType, error: &ApiError) {
        let next = with_failure(&self.snapshot.borrow(), file_type, error);
        self.snapshot.send_replace(next);
    }

    #[must_use]
    pub fn views(&self) -> Vec<FileView> {
        file_views(&self.snapshot.borrow())
    }

    #[must_use]
    pub fn view(&self, file_type: FileType) -> FileView {
        file_view(file_type, &self.snapshot.borrow())
    }
}
