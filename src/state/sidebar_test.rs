use super::*;
use crate::state::storage::MemoryStorage;

#[test]
fn starts_expanded_without_stored_state() {
    let store = SidebarStore::new(Arc::new(MemoryStorage::new()));
    assert_eq!(store.state(), SidebarState::default());
}

#[test]
fn toggle_flips_and_persists() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let store = SidebarStore::new(Arc::clone(&storage));

    assert!(store.toggle());
    assert!(store.state().collapsed);
    assert!(!store.toggle());

    store.set_active_section(Some("uploads".into()));
    let reloaded = SidebarStore::new(storage);
    assert_eq!(reloaded.state(), SidebarState { collapsed: false, active_section: Some("uploads".into()) });
}

#[test]
fn stored_state_uses_camel_case() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    storage.set_item(SIDEBAR_STORAGE_KEY, r#"{"collapsed":true,"activeSection":"reports"}"#).unwrap();
    let store = SidebarStore::new(storage);
    assert!(store.state().collapsed);
    assert_eq!(store.state().active_section.as_deref(), Some("reports"));
}

#[test]
fn unchanged_values_do_not_notify() {
    let store = SidebarStore::new(Arc::new(MemoryStorage::new()));
    let mut rx = store.subscribe();

    store.set_collapsed(false);
    assert!(!rx.has_changed().unwrap());

    store.set_collapsed(true);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().collapsed);
}
