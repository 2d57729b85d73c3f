//! Upload/task polling engine.
//!
//! DESIGN
//! ======
//! Each observed task is a lazy `Stream` built with `stream::unfold` over a
//! small phase machine: `Submit` -> `Poll { polls }` -> `Done`. Nothing is sent
//! until the stream is first polled, and dropping the stream stops further
//! status checks. Dropping never cancels the server task; that takes an explicit
//! `services::tasks::cancel` call.
//!
//! TIMING
//! ======
//! Status checks are spaced by a relative sleep of `PollProfile::interval`.
//! Every check, failed or not, counts towards `max_polls`. A failed status
//! request is retried on the next tick; reaching the ceiling without a
//! terminal status ends the stream with `ApiError::Timeout`.

#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{FileType, RunRequest, Task, TaskStatus};
use crate::services::{files, runs, tasks};
use crate::upload::validate::{DEFAULT_MAX_UPLOAD_BYTES, UploadFile, validate_upload};

/// Stream of progress events for one task.
pub type ProgressStream = BoxStream<'static, Result<ProgressEvent, ApiError>>;

// =============================================================================
// TASK API SEAM
// =============================================================================

/// The backend calls the engine needs. Implemented by [`ApiClient`]; mocked in tests.
#[async_trait::async_trait]
pub trait TaskApi: Send + Sync {
    /// Submit a file for asynchronous processing.
    async fn submit_upload(&self, file_type: FileType, file: &UploadFile) -> Result<Task, ApiError>;

    /// Ask the server to prepare an export of a dataset.
    async fn submit_download(&self, file_type: FileType) -> Result<Task, ApiError>;

    /// Start the NOOS algorithm as a background task.
    async fn submit_run(&self, request: &RunRequest) -> Result<Task, ApiError>;

    /// Current state of a task.
    async fn task(&self, task_id: &str) -> Result<Task, ApiError>;

    /// Result blob of a completed task.
    async fn task_result(&self, task_id: &str) -> Result<Vec<u8>, ApiError>;
}

#[async_trait::async_trait]
impl TaskApi for ApiClient {
    async fn submit_upload(&self, file_type: FileType, file: &UploadFile) -> Result<Task, ApiError> {
        files::upload_async(self, file_type, file).await
    }

    async fn submit_download(&self, file_type: FileType) -> Result<Task, ApiError> {
        files::download_async(self, file_type).await
    }

    async fn submit_run(&self, request: &RunRequest) -> Result<Task, ApiError> {
        runs::run_async(self, request).await
    }

    async fn task(&self, task_id: &str) -> Result<Task, ApiError> {
        tasks::get(self, task_id).await
    }

    async fn task_result(&self, task_id: &str) -> Result<Vec<u8>, ApiError> {
        files::task_result(self, task_id).await
    }
}

// =============================================================================
// PROFILES AND EVENTS
// =============================================================================

/// Cadence and ceiling for one kind of task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProfile {
    pub interval: Duration,
    pub max_polls: u32,
    /// Fetch `/tasks/{id}/result` on completion.
    pub fetch_result: bool,
}

impl PollProfile {
    /// 2 s x 240 checks, 8 minutes.
    pub const UPLOAD: Self = Self { interval: Duration::from_secs(2), max_polls: 240, fetch_result: false };

    /// 5 s x 120 checks, 10 minutes, result blob attached.
    pub const DOWNLOAD: Self = Self { interval: Duration::from_secs(5), max_polls: 120, fetch_result: true };

    /// Algorithm runs: download cadence, no blob.
    pub const RUN: Self = Self { interval: Duration::from_secs(5), max_polls: 120, fetch_result: false };

    #[must_use]
    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    #[must_use]
    pub fn with_max_polls(self, max_polls: u32) -> Self {
        Self { max_polls, ..self }
    }
}

/// One item of a progress stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// 0-100.
    pub progress: u8,
    pub task: Option<Task>,
    pub completed: bool,
    /// Result blob, download tasks only.
    pub result: Option<Vec<u8>>,
}

impl ProgressEvent {
    fn running(task: Task) -> Self {
        Self { progress: task.progress(), task: Some(task), completed: false, result: None }
    }

    fn completed(task: Task, result: Option<Vec<u8>>) -> Self {
        Self { progress: 100, task: Some(task), completed: true, result }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Submits work and turns server tasks into progress streams.
pub struct UploadEngine<A> {
    api: Arc<A>,
    max_upload_bytes: u64,
    upload_profile: PollProfile,
    download_profile: PollProfile,
    run_profile: PollProfile,
}

impl<A> Clone for UploadEngine<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            max_upload_bytes: self.max_upload_bytes,
            upload_profile: self.upload_profile,
            download_profile: self.download_profile,
            run_profile: self.run_profile,
        }
    }
}

impl<A: TaskApi + 'static> UploadEngine<A> {
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_profile: PollProfile::UPLOAD,
            download_profile: PollProfile::DOWNLOAD,
            run_profile: PollProfile::RUN,
        }
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    #[must_use]
    pub fn with_profiles(mut self, upload: PollProfile, download: PollProfile, run: PollProfile) -> Self {
        self.upload_profile = upload;
        self.download_profile = download;
        self.run_profile = run;
        self
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Validate `file` locally, then submit it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without touching the network when the
    /// file is absent, has a disallowed extension or is too large; otherwise
    /// whatever the submission request fails with.
    pub async fn submit_upload(&self, file_type: FileType, file: Option<&UploadFile>) -> Result<Task, ApiError> {
        submit_upload(self.api.as_ref(), file_type, file, self.max_upload_bytes).await
    }

    /// Submit `file` and follow the resulting task to a terminal state.
    pub fn observe_upload(&self, file_type: FileType, file: Option<UploadFile>) -> ProgressStream {
        let submission = Submission::Upload { file_type, file, max_bytes: self.max_upload_bytes };
        run_stream(Arc::clone(&self.api), self.upload_profile, Phase::Submit(submission))
    }

    /// Request an export of `file_type` and follow it, attaching the blob on completion.
    pub fn observe_download(&self, file_type: FileType) -> ProgressStream {
        run_stream(Arc::clone(&self.api), self.download_profile, Phase::Submit(Submission::Download { file_type }))
    }

    /// Start the algorithm and follow the run task.
    pub fn observe_run(&self, request: RunRequest) -> ProgressStream {
        run_stream(Arc::clone(&self.api), self.run_profile, Phase::Submit(Submission::Run { request }))
    }

    /// Follow a task that was already submitted.
    pub fn observe_task(&self, task_id: impl Into<String>, profile: PollProfile) -> ProgressStream {
        run_stream(Arc::clone(&self.api), profile, Phase::Poll { task_id: task_id.into(), polls: 0 })
    }
}

async fn submit_upload<A: TaskApi + ?Sized>(
    api: &A,
    file_type: FileType,
    file: Option<&UploadFile>,
    max_bytes: u64,
) -> Result<Task, ApiError> {
    let file = validate_upload(file, max_bytes)?;
    info!(%file_type, name = %file.name, bytes = file.size(), "submitting upload");
    api.submit_upload(file_type, file).await
}

// =============================================================================
// PHASE MACHINE
// =============================================================================

enum Submission {
    Upload { file_type: FileType, file: Option<UploadFile>, max_bytes: u64 },
    Download { file_type: FileType },
    Run { request: RunRequest },
}

enum Phase {
    Submit(Submission),
    Poll { task_id: String, polls: u32 },
    Done,
}

struct PollState<A: ?Sized> {
    api: Arc<A>,
    profile: PollProfile,
    phase: Phase,
}

fn run_stream<A: TaskApi + ?Sized + 'static>(api: Arc<A>, profile: PollProfile, phase: Phase) -> ProgressStream {
    stream::unfold(PollState { api, profile, phase }, step).boxed()
}

async fn step<A: TaskApi + ?Sized>(
    mut state: PollState<A>,
) -> Option<(Result<ProgressEvent, ApiError>, PollState<A>)> {
    loop {
        match std::mem::replace(&mut state.phase, Phase::Done) {
            Phase::Done => return None,
            Phase::Submit(submission) => {
                let submitted = match submission {
                    Submission::Upload { file_type, file, max_bytes } => {
                        submit_upload(state.api.as_ref(), file_type, file.as_ref(), max_bytes).await
                    }
                    Submission::Download { file_type } => {
                        info!(%file_type, "requesting export");
                        state.api.submit_download(file_type).await
                    }
                    Submission::Run { request } => {
                        info!(params_id = ?request.params_id, "starting NOOS run");
                        state.api.submit_run(&request).await
                    }
                };
                let task = match submitted {
                    Ok(task) => task,
                    Err(e) => return Some((Err(e), state)),
                };
                match task.status {
                    TaskStatus::Failed => return Some((Err(ApiError::TaskFailed { task: Box::new(task) }), state)),
                    TaskStatus::Cancelled => return Some((Err(ApiError::Cancelled { task_id: task.id }), state)),
                    _ => {}
                }
                info!(task_id = %task.id, status = %task.status, "task submitted");
                state.phase = Phase::Poll { task_id: task.id, polls: 0 };
            }
            Phase::Poll { task_id, polls } => {
                if polls >= state.profile.max_polls {
                    warn!(%task_id, polls, "poll ceiling reached");
                    return Some((Err(ApiError::Timeout { polls }), state));
                }
                tokio::time::sleep(state.profile.interval).await;
                let polls = polls + 1;

                let task = match state.api.task(&task_id).await {
                    Ok(task) => task,
                    Err(e) => {
                        warn!(%task_id, polls, error = %e, "status check failed, retrying");
                        state.phase = Phase::Poll { task_id, polls };
                        continue;
                    }
                };
                debug!(%task_id, polls, status = %task.status, progress = task.progress(), "task status");

                let outcome = match task.status.clone() {
                    TaskStatus::Pending | TaskStatus::Running => {
                        state.phase = Phase::Poll { task_id, polls };
                        Ok(ProgressEvent::running(task))
                    }
                    TaskStatus::Completed => {
                        info!(%task_id, polls, "task completed");
                        completed_event(state.api.as_ref(), state.profile, task).await
                    }
                    TaskStatus::Failed => Err(ApiError::TaskFailed { task: Box::new(task) }),
                    TaskStatus::Cancelled => Err(ApiError::Cancelled { task_id }),
                    TaskStatus::Unknown(status) => Err(ApiError::UnknownStatus { status }),
                };
                return Some((outcome, state));
            }
        }
    }
}

async fn completed_event<A: TaskApi + ?Sized>(
    api: &A,
    profile: PollProfile,
    task: Task,
) -> Result<ProgressEvent, ApiError> {
    if !profile.fetch_result {
        return Ok(ProgressEvent::completed(task, None));
    }
    let blob = api.task_result(&task.id).await?;
    Ok(ProgressEvent::completed(task, Some(blob)))
}

/// Drain a progress stream, calling `on_progress` for every event, and return
/// the completion event.
///
/// # Errors
///
/// Returns the stream's error, or [`ApiError::Transport`] if the stream ends
/// without a completion event.
pub async fn wait_for_completion<F>(mut stream: ProgressStream, mut on_progress: F) -> Result<ProgressEvent, ApiError>
where
    F: FnMut(&ProgressEvent),
{
    while let Some(item) = stream.next().await {
        let event = item?;
        on_progress(&event);
        if event.completed {
            return Ok(event);
        }
    }
    Err(ApiError::Transport("progress stream ended without completion".to_owned()))
}
