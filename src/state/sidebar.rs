//! Sidebar chrome state: collapsed flag and active section.

#[cfg(test)]
#[path = "sidebar_test.rs"]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::state::storage::{KeyValueStorage, load_json, save_json};

pub const SIDEBAR_STORAGE_KEY: &str = "noos_console_sidebar";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SidebarState {
    pub collapsed: bool,
    pub active_section: Option<String>,
}

pub struct SidebarStore {
    state: watch::Sender<SidebarState>,
    storage: Arc<dyn KeyValueStorage>,
}

impl SidebarStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let initial = load_json(storage.as_ref(), SIDEBAR_STORAGE_KEY).unwrap_or_default();
        let (state, _) = watch::channel(initial);
        Self { state, storage }
    }

    #[must_use]
    pub fn state(&self) -> SidebarState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SidebarState> {
        self.state.subscribe()
    }

    pub fn toggle(&self) -> bool {
        let collapsed = !self.state.borrow().collapsed;
        self.set_collapsed(collapsed);
        collapsed
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.update(|s| s.collapsed = collapsed);
    }

    pub fn set_active_section(&self, section: Option<String>) {
        self.update(|s| s.active_section = section);
    }

    fn update(&self, change: impl FnOnce(&mut SidebarState)) {
        let mut next = self.state();
        change(&mut next);
        if next == *self.state.borrow() {
            return;
        }
        save_json(self.storage.as_ref(), SIDEBAR_STORAGE_KEY, &next);
        self.state.send_replace(next);
    }
}
