//! Task endpoints under `/tasks`.

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{Task, TaskStats, TaskStatus};
use crate::services::or_fallback;

fn task_path(task_id: &str) -> String {
    format!("/tasks/{task_id}")
}

/// All tasks known to the server, newest first as the server orders them.
pub async fn list(client: &ApiClient) -> Vec<Task> {
    or_fallback(client.get_json("/tasks").await, "GET /tasks", Vec::new)
}

/// Current state of one task. Propagates errors; the polling engine relies on it.
///
/// # Errors
///
/// Returns the transport, server or parse error of the request.
pub async fn get(client: &ApiClient, task_id: &str) -> Result<Task, ApiError> {
    client.get_json(&task_path(task_id)).await
}

/// Current state of one task, `None` on any failure.
pub async fn find(client: &ApiClient, task_id: &str) -> Option<Task> {
    or_fallback(get(client, task_id).await.map(Some), "GET /tasks/{id}", || None)
}

pub async fn stats(client: &ApiClient) -> TaskStats {
    or_fallback(client.get_json("/tasks/stats").await, "GET /tasks/stats", TaskStats::default)
}

pub async fn by_status(client: &ApiClient, status: &TaskStatus) -> Vec<Task> {
    let path = format!("/tasks/status/{status}");
    or_fallback(client.get_json(&path).await, "GET /tasks/status/{status}", Vec::new)
}

/// Ask the server to cancel a task.
///
/// # Errors
///
/// Propagates the request error.
pub async fn cancel(client: &ApiClient, task_id: &str) -> Result<Task, ApiError> {
    client.post_empty(&format!("{}/cancel", task_path(task_id))).await
}
