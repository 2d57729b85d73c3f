use super::*;
use crate::state::storage::MemoryStorage;

fn memory() -> Arc<dyn KeyValueStorage> {
    Arc::new(MemoryStorage::new())
}

#[test]
fn effective_theme_per_mode() {
    let state = |mode, system_dark| ThemeState { mode, system_dark };
    assert_eq!(state(ThemeMode::System, true).effective(), Theme::Dark);
    assert_eq!(state(ThemeMode::System, false).effective(), Theme::Light);
    assert_eq!(state(ThemeMode::Light, true).effective(), Theme::Light);
    assert_eq!(state(ThemeMode::Dark, false).effective(), Theme::Dark);
}

#[test]
fn defaults_to_system_mode() {
    let store = ThemeStore::new(memory(), true);
    assert_eq!(store.mode(), ThemeMode::System);
    assert_eq!(store.theme(), Theme::Dark);
}

#[test]
fn set_mode_persists() {
    let storage = memory();
    let store = ThemeStore::new(Arc::clone(&storage), false);
    store.set_mode(ThemeMode::Dark);
    assert_eq!(storage.get_item(THEME_STORAGE_KEY).as_deref(), Some(r#""dark""#));

    let reloaded = ThemeStore::new(storage, false);
    assert_eq!(reloaded.mode(), ThemeMode::Dark);
    assert_eq!(reloaded.theme(), Theme::Dark);
}

#[test]
fn malformed_stored_mode_falls_back_to_system() {
    let storage = memory();
    storage.set_item(THEME_STORAGE_KEY, r#""sepia""#).unwrap();
    assert_eq!(ThemeStore::new(storage, false).mode(), ThemeMode::System);
}

#[test]
fn toggle_leaves_system_mode() {
    let store = ThemeStore::new(memory(), true);
    assert_eq!(store.toggle(), Theme::Light);
    assert_eq!(store.mode(), ThemeMode::Light);
    assert_eq!(store.toggle(), Theme::Dark);
    assert_eq!(store.mode(), ThemeMode::Dark);
}

#[test]
fn system_mode_follows_os_signal() {
    let store = ThemeStore::new(memory(), false);
    let mut rx = store.subscribe();

    store.on_system_change(true);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().effective(), Theme::Dark);

    store.on_system_change(true);
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn explicit_mode_ignores_os_signal() {
    let store = ThemeStore::new(memory(), false);
    store.set_mode(ThemeMode::Light);
    let rx = store.subscribe();

    store.on_system_change(true);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(store.theme(), Theme::Light);

    store.set_mode(ThemeMode::System);
    assert_eq!(store.theme(), Theme::Dark);
}

#[tokio::test]
async fn started_store_tracks_signal_until_shutdown() {
    let (os, system) = watch::channel(false);
    let store = ThemeStore::start(memory(), system);
    let mut rx = store.subscribe();

    os.send(true).unwrap();
    rx.changed().await.unwrap();
    assert_eq!(store.theme(), Theme::Dark);

    store.shutdown();
    tokio::task::yield_now().await;
    let _ = os.send(false);
    tokio::task::yield_now().await;
    assert_eq!(store.theme(), Theme::Dark);
}
