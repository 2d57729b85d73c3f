//! Notification center state.
//!
//! DESIGN
//! ======
//! Two lists feed the center: a local buffer of client-raised notices
//! (upload finished, run failed) persisted under
//! [`NOTIFICATIONS_STORAGE_KEY`], and the server's most recent page. Readers
//! get the merge: newest first, one entry per key. Every change publishes a
//! new `NotificationState`; lists are never edited behind a subscriber's back.
//!
//! Marking as read is a write: server-backed entries go through the API first
//! and the local projection only changes once the server accepted it.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::{NotificationKind, ServerNotification};
use crate::services::notifications::{self as api, RECENT_PAGE_SIZE};
use crate::state::storage::{KeyValueStorage, load_json, save_json};

pub const NOTIFICATIONS_STORAGE_KEY: &str = "noos_console_notifications";

/// Local notices kept before the oldest are dropped.
pub const LOCAL_BUFFER_LIMIT: usize = 50;

// =============================================================================
// MODEL
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "lowercase")]
pub enum NotificationKey {
    Local(Uuid),
    Server(i64),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub key: NotificationKey,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    /// RFC 3339 for local entries, server format otherwise.
    pub created_at: String,
}

impl From<ServerNotification> for Notification {
    fn from(n: ServerNotification) -> Self {
        Self {
            key: NotificationKey::Server(n.id),
            title: n.title,
            message: n.message,
            kind: n.kind,
            read: n.read,
            created_at: n.created_at,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub local: Vec<Notification>,
    pub server: Vec<Notification>,
}

impl NotificationState {
    /// Local and server entries, newest first, first occurrence of each key kept.
    #[must_use]
    pub fn merged(&self) -> Vec<Notification> {
        let mut seen = HashSet::new();
        let mut all: Vec<Notification> = self
            .local
            .iter()
            .chain(self.server.iter())
            .filter(|n| seen.insert(n.key))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.merged().iter().filter(|n| !n.read).count()
    }
}

// =============================================================================
// API SEAM
// =============================================================================

/// Notification endpoints the store needs. Implemented by [`ApiClient`].
#[async_trait::async_trait]
pub trait NotificationApi: Send + Sync {
    async fn recent(&self, size: u32) -> Vec<ServerNotification>;
    async fn mark_read(&self, id: i64) -> Result<(), ApiError>;
    async fn mark_all_read(&self) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
impl NotificationApi for ApiClient {
    async fn recent(&self, size: u32) -> Vec<ServerNotification> {
        api::recent(self, size).await
    }

    async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        api::mark_read(self, id).await
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        api::mark_all_read(self).await
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct NotificationStore<A> {
    api: Arc<A>,
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<NotificationState>,
}

impl<A: NotificationApi> NotificationStore<A> {
    /// Build a store with the persisted local buffer. The server list starts
    /// empty until `refresh`.
    #[must_use]
    pub fn new(api: Arc<A>, storage: Arc<dyn KeyValueStorage>) -> Self {
        let local: Vec<Notification> = load_json(storage.as_ref(), NOTIFICATIONS_STORAGE_KEY).unwrap_or_default();
        let (state, _) = watch::channel(NotificationState { local, server: Vec::new() });
        Self { api, storage, state }
    }

    #[must_use]
    pub fn state(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().merged()
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.state.borrow().unread_count()
    }

    /// Raise a local notice.
    pub fn push(&self, kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> NotificationKey {
        let key = NotificationKey::Local(Uuid::new_v4());
        let notification =
            Notification { key, title: title.into(), message: message.into(), kind, read: false, created_at: now_rfc3339() };
        let mut next = self.state();
        next.local.insert(0, notification);
        next.local.truncate(LOCAL_BUFFER_LIMIT);
        self.publish(next, true);
        key
    }

    /// Replace the server list with the most recent page.
    pub async fn refresh(&self) {
        let server: Vec<Notification> =
            self.api.recent(RECENT_PAGE_SIZE).await.into_iter().map(Notification::from).collect();
        let mut next = self.state();
        next.server = server;
        self.publish(next, false);
    }

    /// Mark one entry read.
    ///
    /// # Errors
    ///
    /// Propagates the server error for server-backed entries; the local
    /// projection is left unchanged in that case.
    pub async fn mark_read(&self, key: NotificationKey) -> Result<(), ApiError> {
        if let NotificationKey::Server(id) = key {
            self.api.mark_read(id).await?;
        }
        let mut next = self.state();
        for n in next.local.iter_mut().chain(next.server.iter_mut()) {
            if n.key == key {
                n.read = true;
            }
        }
        self.publish(next, matches!(key, NotificationKey::Local(_)));
        Ok(())
    }

    /// Mark every entry read, server first.
    ///
    /// # Errors
    ///
    /// Propagates the server error; nothing changes locally in that case.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.api.mark_all_read().await?;
        let mut next = self.state();
        for n in next.local.iter_mut().chain(next.server.iter_mut()) {
            n.read = true;
        }
        info!(count = next.local.len() + next.server.len(), "notifications marked read");
        self.publish(next, true);
        Ok(())
    }

    /// Drop every local notice.
    pub fn clear_local(&self) {
        let mut next = self.state();
        next.local.clear();
        self.publish(next, true);
    }

    fn publish(&self, next: NotificationState, persist_local: bool) {
        if persist_local {
            save_json(self.storage.as_ref(), NOTIFICATIONS_STORAGE_KEY, &next.local);
        }
        self.state.send_replace(next);
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
