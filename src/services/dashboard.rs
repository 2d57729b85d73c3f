//! Dashboard summary assembled from several read endpoints.
//!
//! Each part is fetched concurrently and falls back on its own, so one
//! failing endpoint blanks one panel instead of the whole dashboard.

use crate::net::ApiClient;
use crate::net::types::{FileType, NoosSummary, RunUpdate, TaskStats, UploadStatusSnapshot};
use crate::services::{files, runs, tasks};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub files: UploadStatusSnapshot,
    pub tasks: TaskStats,
    pub latest_run: Option<RunUpdate>,
    pub noos: NoosSummary,
}

impl DashboardSummary {
    /// Rows loaded across all datasets.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.files.files.values().map(|r| r.count).sum()
    }

    /// Every dataset exists, so the algorithm has input.
    #[must_use]
    pub fn ready_to_run(&self) -> bool {
        FileType::ALL.iter().all(|ft| self.files.exists(*ft))
    }
}

/// Fetch every dashboard panel.
pub async fn load(client: &ApiClient) -> DashboardSummary {
    let (files, tasks, updates, noos) =
        tokio::join!(files::status(client), tasks::stats(client), runs::updates(client), runs::summary(client));
    DashboardSummary { files, tasks, latest_run: latest_run(updates), noos }
}

/// The run with the highest id.
fn latest_run(updates: Vec<RunUpdate>) -> Option<RunUpdate> {
    updates.into_iter().max_by_key(|u| u.id)
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
