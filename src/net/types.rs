//! Wire schema for the merchandising backend.
//!
//! DESIGN
//! ======
//! The backend speaks camelCase JSON. Identifiers arrive as either numbers or
//! strings depending on the endpoint, so task ids are normalized to `String`.
//! Task status keeps unrecognised values verbatim so the polling engine can
//! report them instead of failing deserialization.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// =============================================================================
// FILE TYPE
// =============================================================================

/// Master/transaction dataset kinds accepted by the upload endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Styles,
    Stores,
    Skus,
    Sales,
}

impl FileType {
    /// All file types in display order.
    pub const ALL: [FileType; 4] = [FileType::Styles, FileType::Stores, FileType::Skus, FileType::Sales];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Stores => "stores",
            Self::Skus => "skus",
            Self::Sales => "sales",
        }
    }

    /// File types that must exist on the server before this one may be uploaded.
    #[must_use]
    pub fn prerequisites(self) -> &'static [FileType] {
        match self {
            Self::Styles | Self::Stores => &[],
            Self::Skus => &[FileType::Styles],
            Self::Sales => &[FileType::Styles, FileType::Skus, FileType::Stores],
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "styles" => Ok(Self::Styles),
            "stores" => Ok(Self::Stores),
            "skus" => Ok(Self::Skus),
            "sales" => Ok(Self::Sales),
            other => Err(format!("unknown file type: {other}")),
        }
    }
}

// =============================================================================
// TASK
// =============================================================================

/// Lifecycle status of a server-side task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    /// A status string this client does not recognise.
    Unknown(String),
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(raw) => raw,
        }
    }

    /// COMPLETED, FAILED and CANCELLED never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-tracked unit of asynchronous work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_type: String,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress_percentage: f64,
    #[serde(default)]
    pub progress_message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result_reference: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    /// Progress clamped to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress(&self) -> u8 {
        if self.progress_percentage.is_nan() {
            return 0;
        }
        self.progress_percentage.clamp(0.0, 100.0).round() as u8
    }
}

/// Task counts per status from `/tasks/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

/// Missing and `null` both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

// =============================================================================
// UPLOAD STATUS
// =============================================================================

/// Server view of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileStatusRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub exists: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub processing: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub failed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub progress_percentage: f64,
    pub progress_message: Option<String>,
    pub error_summary: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub task_id: Option<String>,
}

/// Status of every dataset, as returned by `/file/status`.
///
/// Keys the client does not know are dropped on deserialization, whatever
/// their value. A malformed record for a known key reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>", into = "BTreeMap<String, FileStatusRecord>")]
pub struct UploadStatusSnapshot {
    pub files: BTreeMap<FileType, FileStatusRecord>,
}

impl From<BTreeMap<String, serde_json::Value>> for UploadStatusSnapshot {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let mut files = BTreeMap::new();
        for (key, value) in raw {
            let Ok(file_type) = key.parse::<FileType>() else {
                continue;
            };
            match serde_json::from_value::<FileStatusRecord>(value) {
                Ok(record) => {
                    files.insert(file_type, record);
                }
                Err(e) => warn!(%file_type, error = %e, "ignoring malformed status record"),
            }
        }
        Self { files }
    }
}

impl From<UploadStatusSnapshot> for BTreeMap<String, FileStatusRecord> {
    fn from(snapshot: UploadStatusSnapshot) -> Self {
        snapshot
            .files
            .into_iter()
            .map(|(ft, record)| (ft.as_str().to_owned(), record))
            .collect()
    }
}

impl UploadStatusSnapshot {
    /// Record for `file_type`, or `None` when the server did not report it.
    #[must_use]
    pub fn get(&self, file_type: FileType) -> Option<&FileStatusRecord> {
        self.files.get(&file_type)
    }

    /// Whether the server holds data for `file_type`. Absent records count as missing.
    #[must_use]
    pub fn exists(&self, file_type: FileType) -> bool {
        self.get(file_type).is_some_and(|r| r.exists)
    }

    /// Builder used by tests and fallbacks.
    #[must_use]
    pub fn with(mut self, file_type: FileType, record: FileStatusRecord) -> Self {
        self.files.insert(file_type, record);
        self
    }
}

// =============================================================================
// UPLOAD DIAGNOSTICS
// =============================================================================

/// Spring-style page wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// Page with no rows, used as the read-path fallback.
    #[must_use]
    pub fn empty(number: u32, size: u32) -> Self {
        Self { content: Vec::new(), total_elements: 0, total_pages: 0, number, size }
    }
}

/// A row the server rejected during upload processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadErrorRecord {
    pub row_number: u64,
    pub field: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

/// A row the server skipped (duplicate, empty, filtered).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkippedRow {
    pub row_number: u64,
    pub reason: String,
    pub raw_line: Option<String>,
}

/// Aggregate validation outcome for an upload task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationReport {
    pub total_rows: u64,
    pub valid_rows: u64,
    pub error_rows: u64,
    pub skipped_rows: u64,
    pub errors_by_field: BTreeMap<String, u64>,
}

// =============================================================================
// ALGORITHM PARAMETERS
// =============================================================================

/// A named NOOS parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlgoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub param_name: String,
    pub description: Option<String>,
    /// Sell-through share below which a style is treated as liquidation stock.
    pub liquidation_threshold: f64,
    /// Rate-of-sale multiple over the category mean that marks a bestseller.
    pub bestseller_multiplier: f64,
    /// Minimum units sold in the window to be classified at all.
    pub min_volume_threshold: f64,
    /// Share of weeks with sales required for a core classification.
    pub consistency_threshold: f64,
    pub algorithm_run_days: u32,
    pub core_duration_months: u32,
    pub bestseller_duration_days: u32,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: bool,
}

impl Default for AlgoParams {
    fn default() -> Self {
        Self {
            id: None,
            param_name: "default".to_owned(),
            description: Some("Built-in default parameters".to_owned()),
            liquidation_threshold: 0.25,
            bestseller_multiplier: 1.2,
            min_volume_threshold: 25.0,
            consistency_threshold: 0.75,
            algorithm_run_days: 90,
            core_duration_months: 6,
            bestseller_duration_days: 90,
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }
}

// =============================================================================
// RUNS, RESULTS, REPORTS
// =============================================================================

/// Body of `POST /run/noos[/async]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_id: Option<i64>,
}

/// One historical NOOS execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunUpdate {
    pub id: i64,
    pub run_date: Option<String>,
    pub status: String,
    pub params_id: Option<i64>,
    pub param_name: Option<String>,
    pub styles_processed: u64,
    pub core_count: u64,
    pub bestseller_count: u64,
    pub fashion_count: u64,
    pub message: Option<String>,
}

/// Classification outcome for one style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoosResult {
    pub category: String,
    pub style_code: String,
    pub season_code: Option<String>,
    pub noos_type: String,
    pub rate_of_sale: f64,
    pub total_quantity: f64,
    pub total_revenue: f64,
    pub days_available: u32,
    pub run_id: Option<i64>,
}

/// Classification counts for the latest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoosSummary {
    pub run_id: Option<i64>,
    pub total: u64,
    pub core: u64,
    pub bestseller: u64,
    pub fashion: u64,
}

/// A report as rows of named cells. Report layouts are server-defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportTable {
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl ReportTable {
    /// Column names in first-seen order across all rows.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Render as tab-separated values with a header line.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let columns = self.columns();
        let mut out = columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| match row.get(c) {
                    None | Some(serde_json::Value::Null) => String::new(),
                    Some(serde_json::Value::String(s)) => tsv_cell(s),
                    Some(other) => tsv_cell(&other.to_string()),
                })
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Tabs and line breaks would shift columns, so they become spaces.
fn tsv_cell(raw: &str) -> String {
    raw.replace(['\t', '\n', '\r'], " ")
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Severity of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A notification as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerNotification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: String,
}

/// Body of `/notifications/unread-count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    #[serde(default)]
    pub count: u64,
}
