//! Notification endpoints under `/notifications`.

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{Page, ServerNotification, UnreadCount};
use crate::services::{PageQuery, or_fallback};

/// Size of the "most recent" page merged into the local store.
pub const RECENT_PAGE_SIZE: u32 = 20;

/// Most recent notifications, newest first. Empty on failure.
pub async fn recent(client: &ApiClient, size: u32) -> Vec<ServerNotification> {
    let page: Page<ServerNotification> = or_fallback(
        client.get_json_query("/notifications", &PageQuery { page: 0, size }).await,
        "GET /notifications",
        || Page::empty(0, size),
    );
    page.content
}

pub async fn unread_count(client: &ApiClient) -> u64 {
    let count: UnreadCount =
        or_fallback(client.get_json("/notifications/unread-count").await, "GET /notifications/unread-count", UnreadCount::default);
    count.count
}

/// # Errors
///
/// Propagates the request error.
pub async fn mark_read(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.put_unit(&format!("/notifications/{id}/read")).await
}

/// # Errors
///
/// Propagates the request error.
pub async fn mark_all_read(client: &ApiClient) -> Result<(), ApiError> {
    client.put_unit("/notifications/read-all").await
}
