//! Theme preference store.
//!
//! The operator picks light, dark or system. In system mode the effective
//! theme follows the OS dark-mode signal and re-derives whenever it changes;
//! explicit light/dark ignore it. The chosen mode persists under
//! [`THEME_STORAGE_KEY`].
//!
//! LIFECYCLE
//! =========
//! `ThemeStore::start` spawns a listener on the OS signal; `shutdown` (or
//! dropping the store) aborts it. `ThemeStore::new` builds a store without a
//! listener, for callers that forward OS changes through `on_system_change`.

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::storage::{KeyValueStorage, load_json, save_json};

pub const THEME_STORAGE_KEY: &str = "noos_console_theme";

/// What the operator selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// What is actually applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    /// Last value of the OS dark-mode signal.
    pub system_dark: bool,
}

impl ThemeState {
    #[must_use]
    pub fn effective(&self) -> Theme {
        match self.mode {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
            ThemeMode::System if self.system_dark => Theme::Dark,
            ThemeMode::System => Theme::Light,
        }
    }
}

pub struct ThemeStore {
    state: Arc<watch::Sender<ThemeState>>,
    storage: Arc<dyn KeyValueStorage>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ThemeStore {
    /// Build a store seeded from storage and the current OS preference.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, system_dark: bool) -> Self {
        let mode = load_json(storage.as_ref(), THEME_STORAGE_KEY).unwrap_or_default();
        let (state, _) = watch::channel(ThemeState { mode, system_dark });
        Self { state: Arc::new(state), storage, listener: Mutex::new(None) }
    }

    /// Build a store that follows `system` until shut down. Must be called
    /// inside a tokio runtime.
    #[must_use]
    pub fn start(storage: Arc<dyn KeyValueStorage>, mut system: watch::Receiver<bool>) -> Self {
        let store = Self::new(storage, *system.borrow_and_update());
        let state = Arc::clone(&store.state);
        let handle = tokio::spawn(async move {
            while system.changed().await.is_ok() {
                let dark = *system.borrow_and_update();
                apply_system(&state, dark);
            }
        });
        *store.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        store
    }

    #[must_use]
    pub fn state(&self) -> ThemeState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        self.state().mode
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state().effective()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.subscribe()
    }

    /// Select a mode and persist it.
    pub fn set_mode(&self, mode: ThemeMode) {
        self.state.send_modify(|s| s.mode = mode);
        save_json(self.storage.as_ref(), THEME_STORAGE_KEY, &mode);
    }

    /// Flip the effective theme, leaving system mode for an explicit one.
    pub fn toggle(&self) -> Theme {
        let next = match self.theme() {
            Theme::Light => ThemeMode::Dark,
            Theme::Dark => ThemeMode::Light,
        };
        self.set_mode(next);
        self.theme()
    }

    /// Record a new OS dark-mode value. Subscribers are notified only when
    /// the effective theme depends on it.
    pub fn on_system_change(&self, dark: bool) {
        apply_system(&self.state, dark);
    }

    /// Stop following the OS signal.
    pub fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

impl Drop for ThemeStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn apply_system(state: &watch::Sender<ThemeState>, dark: bool) {
    let notified = state.send_if_modified(|s| {
        if s.system_dark == dark {
            return false;
        }
        s.system_dark = dark;
        s.mode == ThemeMode::System
    });
    debug!(dark, notified, "system theme changed");
}
