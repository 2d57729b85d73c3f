//! Error taxonomy shared by the REST client, the polling engine and services.
//!
//! DESIGN
//! ======
//! One enum covers the whole client surface so read paths can collapse any
//! failure into a fallback and write paths can hand the error to the caller
//! untouched. Variants carry strings rather than library errors so the type
//! stays `Clone` and can travel through progress streams.

use crate::net::types::Task;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// A local check rejected the request before anything was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No response was received (connect, timeout, IO).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend answered with an HTML page, usually a proxy error page.
    #[error("backend unreachable (status {status})")]
    BackendUnreachable { status: u16 },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The server-side task finished in FAILED.
    #[error("task {} failed: {}", task.id, task.error_message.as_deref().unwrap_or("no error message"))]
    TaskFailed { task: Box<Task> },

    /// The server-side task was cancelled.
    #[error("task {task_id} was cancelled")]
    Cancelled { task_id: String },

    /// The task reported a status this client does not know.
    #[error("unknown task status: {status}")]
    UnknownStatus { status: String },

    /// The poll ceiling was reached without a terminal status.
    #[error("timed out after {polls} status checks")]
    Timeout { polls: u32 },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// A local file could not be read or written.
    #[error("io failed: {0}")]
    Io(String),
}

impl ApiError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Server { .. } => "E_SERVER",
            Self::BackendUnreachable { .. } => "E_BACKEND_UNREACHABLE",
            Self::Parse(_) => "E_PARSE",
            Self::TaskFailed { .. } => "E_TASK_FAILED",
            Self::Cancelled { .. } => "E_CANCELLED",
            Self::UnknownStatus { .. } => "E_UNKNOWN_STATUS",
            Self::Timeout { .. } => "E_TIMEOUT",
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
            Self::Io(_) => "E_IO",
        }
    }

    /// Whether repeating the same request could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::BackendUnreachable { .. } | Self::Server { status: 429 | 500..=599, .. }
        )
    }

    /// The failed task, when the error came from a FAILED status.
    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::TaskFailed { task } => Some(task),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
