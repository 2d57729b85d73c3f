use super::*;
use crate::net::types::{Task, TaskStatus};

fn record(exists: bool) -> FileStatusRecord {
    FileStatusRecord { exists, count: if exists { 100 } else { 0 }, ..Default::default() }
}

fn event(progress: u8, completed: bool) -> ProgressEvent {
    let task = Task {
        id: "77".into(),
        task_type: "UPLOAD".into(),
        status: if completed { TaskStatus::Completed } else { TaskStatus::Running },
        progress_percentage: f64::from(progress),
        progress_message: Some(format!("{progress}% done")),
        error_message: None,
        result_reference: None,
        created_at: None,
        updated_at: None,
    };
    ProgressEvent { progress, task: Some(task), completed, result: None }
}

#[test]
fn empty_snapshot_views() {
    let views = file_views(&UploadStatusSnapshot::default());
    let states: Vec<FileState> = views.iter().map(|v| v.state).collect();
    assert_eq!(states, vec![FileState::Pending, FileState::Pending, FileState::Blocked, FileState::Blocked]);
    assert!(views[0].can_upload);
    assert!(!views[3].can_upload);
    assert_eq!(views[3].message, "Please upload styles, skus, stores before uploading sales");
}

#[test]
fn processing_dataset_cannot_be_reuploaded() {
    let snapshot = UploadStatusSnapshot::default()
        .with(FileType::Styles, FileStatusRecord { processing: true, ..Default::default() });
    let view = file_view(FileType::Styles, &snapshot);
    assert_eq!(view.state, FileState::Processing);
    assert!(!view.can_upload);
    assert!(view.message.is_empty());
}

#[test]
fn failed_and_existing_states() {
    let snapshot = UploadStatusSnapshot::default()
        .with(FileType::Styles, record(true))
        .with(FileType::Stores, FileStatusRecord { failed: true, ..Default::default() });
    assert_eq!(file_view(FileType::Styles, &snapshot).state, FileState::Success);
    assert_eq!(file_view(FileType::Stores, &snapshot).state, FileState::Error);
    assert_eq!(file_view(FileType::Skus, &snapshot).state, FileState::Pending);
}

#[test]
fn progress_marks_processing_then_success() {
    let start = UploadStatusSnapshot::default().with(FileType::Styles, record(true));

    let running = with_progress(&start, FileType::Skus, &event(40, false));
    let skus = running.get(FileType::Skus).unwrap();
    assert!(skus.processing);
    assert!(!skus.exists);
    assert_eq!(skus.task_id.as_deref(), Some("77"));
    assert_eq!(skus.progress_message.as_deref(), Some("40% done"));
    assert!(start.get(FileType::Skus).is_none());

    let done = with_progress(&running, FileType::Skus, &event(100, true));
    let skus = done.get(FileType::Skus).unwrap();
    assert!(skus.exists);
    assert!(!skus.processing);
    assert!((skus.progress_percentage - 100.0).abs() < f64::EPSILON);
}

#[test]
fn failure_records_error_and_task() {
    let start =
        UploadStatusSnapshot::default().with(FileType::Styles, FileStatusRecord { processing: true, ..Default::default() });
    let task = event(60, false).task.unwrap();
    let err = ApiError::TaskFailed { task: Box::new(Task { error_message: Some("bad row".into()), ..task }) };

    let failed = with_failure(&start, FileType::Styles, &err);
    let styles = failed.get(FileType::Styles).unwrap();
    assert!(styles.failed);
    assert!(!styles.processing);
    assert_eq!(styles.task_id.as_deref(), Some("77"));
    assert!(styles.error_summary.as_deref().unwrap().contains("bad row"));
}

#[test]
fn board_publishes_each_patch() {
    let board = UploadBoard::default();
    let mut rx = board.subscribe();

    board.apply_progress(FileType::Styles, &event(20, false));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().get(FileType::Styles).map(|r| r.processing), Some(true));
    assert_eq!(board.view(FileType::Styles).state, FileState::Processing);

    board.apply_progress(FileType::Styles, &event(100, true));
    assert!(rx.has_changed().unwrap());
    assert_eq!(board.view(FileType::Styles).state, FileState::Success);
    assert!(board.view(FileType::Skus).can_upload);
}

#[test]
fn board_failure_and_replace() {
    let board = UploadBoard::new(UploadStatusSnapshot::default());
    board.apply_failure(FileType::Stores, &ApiError::Timeout { polls: 240 });
    assert_eq!(board.view(FileType::Stores).state, FileState::Error);

    board.replace(UploadStatusSnapshot::default().with(FileType::Stores, record(true)));
    assert_eq!(board.view(FileType::Stores).state, FileState::Success);
    assert_eq!(board.snapshot().get(FileType::Stores).map(|r| r.count), Some(100));
    assert_eq!(board.views().len(), 4);
}
