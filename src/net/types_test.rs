use super::*;

// =========================================================================
// FileType
// =========================================================================

#[test]
fn file_type_parses_case_insensitively() {
    assert_eq!("SKUS".parse::<FileType>().unwrap(), FileType::Skus);
    assert_eq!(" sales ".parse::<FileType>().unwrap(), FileType::Sales);
    assert!("orders".parse::<FileType>().is_err());
}

#[test]
fn prerequisites_follow_upload_order() {
    assert!(FileType::Styles.prerequisites().is_empty());
    assert!(FileType::Stores.prerequisites().is_empty());
    assert_eq!(FileType::Skus.prerequisites(), &[FileType::Styles]);
    assert_eq!(FileType::Sales.prerequisites(), &[FileType::Styles, FileType::Skus, FileType::Stores]);
}

// =========================================================================
// Task
// =========================================================================

#[test]
fn task_accepts_numeric_id_and_known_status() {
    let task: Task = serde_json::from_str(
        r#"{"id":42,"taskType":"UPLOAD_STYLES","status":"RUNNING","progressPercentage":37.6,"progressMessage":"row 3000"}"#,
    )
    .unwrap();
    assert_eq!(task.id, "42");
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.progress(), 38);
    assert_eq!(task.progress_message.as_deref(), Some("row 3000"));
}

#[test]
fn task_keeps_unknown_status_verbatim() {
    let task: Task = serde_json::from_str(r#"{"id":"abc","status":"PAUSED"}"#).unwrap();
    assert_eq!(task.status, TaskStatus::Unknown("PAUSED".into()));
    assert!(!task.status.is_terminal());
}

#[test]
fn task_status_roundtrips_as_uppercase_string() {
    assert_eq!(serde_json::to_string(&TaskStatus::Completed).unwrap(), r#""COMPLETED""#);
    assert_eq!(TaskStatus::from("CANCELLED".to_owned()), TaskStatus::Cancelled);
    assert!(TaskStatus::Failed.is_terminal());
    assert!(!TaskStatus::Pending.is_terminal());
}

#[test]
fn task_status_matches_exactly() {
    assert_eq!(TaskStatus::from("running".to_owned()), TaskStatus::Unknown("running".into()));
    let task: Task = serde_json::from_str(r#"{"id":"1","status":"Completed"}"#).unwrap();
    assert!(matches!(task.status, TaskStatus::Unknown(raw) if raw == "Completed"));
}

#[test]
fn task_null_fields_read_as_defaults() {
    let task: Task =
        serde_json::from_str(r#"{"id":1,"taskType":null,"status":"PENDING","progressPercentage":null}"#).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.task_type, "");
    assert_eq!(task.progress(), 0);
}

#[test]
fn progress_is_clamped() {
    let mut task: Task = serde_json::from_str(r#"{"id":"1","status":"RUNNING","progressPercentage":140}"#).unwrap();
    assert_eq!(task.progress(), 100);
    task.progress_percentage = -3.0;
    assert_eq!(task.progress(), 0);
    task.progress_percentage = f64::NAN;
    assert_eq!(task.progress(), 0);
}

// =========================================================================
// UploadStatusSnapshot
// =========================================================================

#[test]
fn snapshot_drops_unknown_keys() {
    let snapshot: UploadStatusSnapshot = serde_json::from_str(
        r#"{
            "styles": {"exists": true, "count": 1200},
            "skus": {"exists": false, "processing": true, "taskId": 7},
            "legacy": {"exists": true}
        }"#,
    )
    .unwrap();
    assert_eq!(snapshot.files.len(), 2);
    assert!(snapshot.exists(FileType::Styles));
    assert!(!snapshot.exists(FileType::Skus));
    assert!(!snapshot.exists(FileType::Sales));
    assert_eq!(snapshot.get(FileType::Skus).and_then(|r| r.task_id.as_deref()), Some("7"));
}

#[test]
fn snapshot_record_nulls_read_as_defaults() {
    let snapshot: UploadStatusSnapshot = serde_json::from_str(
        r#"{
            "styles": {"exists": true, "count": null, "processing": null, "failed": null, "progressPercentage": null},
            "stores": {"exists": null, "count": 5, "taskId": null}
        }"#,
    )
    .unwrap();
    let styles = snapshot.get(FileType::Styles).unwrap();
    assert!(styles.exists);
    assert_eq!(styles.count, 0);
    assert!(!styles.processing && !styles.failed);
    assert!(styles.progress_percentage.abs() < f64::EPSILON);
    assert!(!snapshot.exists(FileType::Stores));
    assert_eq!(snapshot.get(FileType::Stores).map(|r| r.count), Some(5));
}

#[test]
fn snapshot_ignores_scalar_extra_keys() {
    let snapshot: UploadStatusSnapshot = serde_json::from_str(
        r#"{"styles":{"exists":true,"count":10},"lastUpdated":"2024-05-01T09:00:00","totalFiles":4}"#,
    )
    .unwrap();
    assert!(snapshot.exists(FileType::Styles));
    assert_eq!(snapshot.files.len(), 1);
}

#[test]
fn malformed_known_record_reads_as_absent() {
    let snapshot: UploadStatusSnapshot =
        serde_json::from_str(r#"{"styles":{"exists":true},"skus":"pending"}"#).unwrap();
    assert!(snapshot.exists(FileType::Styles));
    assert!(snapshot.get(FileType::Skus).is_none());
}

#[test]
fn snapshot_serializes_with_string_keys() {
    let snapshot =
        UploadStatusSnapshot::default().with(FileType::Stores, FileStatusRecord { exists: true, ..Default::default() });
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["stores"]["exists"], serde_json::Value::Bool(true));
}

// =========================================================================
// Reports and notifications
// =========================================================================

#[test]
fn report_table_renders_tsv_with_union_of_columns() {
    let table: ReportTable = serde_json::from_str(
        r#"[{"style":"S1","qty":3},{"style":"S2","noosType":"core","qty":null}]"#,
    )
    .unwrap();
    assert_eq!(table.columns(), vec!["qty", "style", "noosType"]);
    assert_eq!(table.to_tsv(), "qty\tstyle\tnoosType\n3\tS1\t\n\tS2\tcore\n");
}

#[test]
fn report_cells_cannot_break_layout() {
    let table: ReportTable =
        serde_json::from_str(r#"[{"note":"line one\nline two\r","style":"S\t1"}]"#).unwrap();
    assert_eq!(table.to_tsv(), "note\tstyle\nline one line two \tS 1\n");
}

#[test]
fn algo_params_default_is_active_set() {
    let params = AlgoParams::default();
    assert!(params.is_active);
    assert_eq!(params.param_name, "default");
    assert!(params.id.is_none());
    let json = serde_json::to_value(&params).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["liquidationThreshold"], serde_json::json!(0.25));
}

#[test]
fn server_notification_reads_type_field() {
    let n: ServerNotification =
        serde_json::from_str(r#"{"id":5,"title":"Run done","type":"SUCCESS","createdAt":"2024-03-01T10:00:00"}"#)
            .unwrap();
    assert_eq!(n.kind, NotificationKind::Success);
    assert!(!n.read);
}

#[test]
fn page_tolerates_missing_fields() {
    let page: Page<UploadErrorRecord> =
        serde_json::from_str(r#"{"content":[{"rowNumber":4,"field":"mrp","message":"not a number"}]}"#).unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].row_number, 4);
    assert_eq!(page.total_elements, 0);
}
