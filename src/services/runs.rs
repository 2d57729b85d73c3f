//! NOOS execution and result endpoints.

use serde::Serialize;

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{NoosResult, NoosSummary, RunRequest, RunUpdate, Task};
use crate::services::or_fallback;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<i64>,
}

/// History of algorithm executions.
pub async fn updates(client: &ApiClient) -> Vec<RunUpdate> {
    or_fallback(client.get_json("/run/updates").await, "GET /run/updates", Vec::new)
}

/// Classified styles, for one run or the latest.
pub async fn results(client: &ApiClient, run_id: Option<i64>) -> Vec<NoosResult> {
    or_fallback(
        client.get_json_query("/results/noos", &ResultsQuery { run_id }).await,
        "GET /results/noos",
        Vec::new,
    )
}

pub async fn summary(client: &ApiClient) -> NoosSummary {
    or_fallback(client.get_json("/results/noos/summary").await, "GET /results/noos/summary", NoosSummary::default)
}

/// Start the algorithm as a background task.
///
/// # Errors
///
/// Propagates the request error.
pub async fn run_async(client: &ApiClient, request: &RunRequest) -> Result<Task, ApiError> {
    client.post_json("/run/noos/async", request).await
}

/// Run the algorithm and wait for it inside one request.
///
/// # Errors
///
/// Propagates the request error.
#[deprecated(note = "use `run_async` with the polling engine")]
pub async fn run_sync(client: &ApiClient, request: &RunRequest) -> Result<RunUpdate, ApiError> {
    client.post_json("/run/noos", request).await
}

/// Remove a run and its results.
///
/// # Errors
///
/// Propagates the request error.
pub async fn delete_run(client: &ApiClient, run_id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/report/noos-run/{run_id}")).await
}

/// Results of one run as a TSV blob.
///
/// # Errors
///
/// Propagates the request error.
pub async fn download_run(client: &ApiClient, run_id: i64) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&format!("/download/noos-run/{run_id}")).await
}
