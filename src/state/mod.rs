//! Console state stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each store is constructed explicitly with its storage (and, for theme,
//! the OS appearance signal) and hands out `watch` receivers. New
//! subscribers see the current value; there is no history replay.

pub mod notifications;
pub mod sidebar;
pub mod storage;
pub mod theme;

pub use notifications::{Notification, NotificationKey, NotificationStore};
pub use sidebar::{SidebarState, SidebarStore};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use theme::{Theme, ThemeMode, ThemeStore};
