//! Integration tests for persistence and restart recovery.
//!
//! A restart is simulated by dropping the engine and opening a new one on a
//! clone of the same store.

use focustrack_core::storage::keys;
use focustrack_core::{
    Database, Event, FocusEngine, KeyValueStore, ManualClock, MemoryStore, SessionKind, Theme,
};

fn clock() -> ManualClock {
    ManualClock::at(2024, 5, 1, 9, 0, 0)
}

#[test]
fn test_running_session_survives_restart() {
    let clock = clock();
    let store = MemoryStore::new();
    let id = {
        let mut engine = FocusEngine::open(store.clone(), clock.clone());
        engine.start_session(SessionKind::Focus, 1500);
        engine.current_session().unwrap().id.clone()
    };

    clock.advance_secs(100);
    let engine = FocusEngine::open(store, clock.clone());
    let session = engine.current_session().unwrap();
    assert_eq!(session.id, id);
    assert_eq!(engine.remaining_secs(), 1400);
    assert!(engine.recovered().is_none());
    assert_eq!(engine.stats().total_sessions, 1);
}

#[test]
fn test_expired_session_is_completed_at_its_target_end() {
    let clock = clock();
    let store = MemoryStore::new();
    let target = {
        let mut engine = FocusEngine::open(store.clone(), clock.clone());
        engine.start_session(SessionKind::Focus, 600);
        engine.current_session().unwrap().target_end_time
    };

    clock.advance_secs(3600);
    let engine = FocusEngine::open(store.clone(), clock.clone());
    assert!(engine.current_session().is_none());
    assert!(store.get(keys::CURRENT_SESSION).unwrap().is_none());

    let stats = engine.stats();
    assert_eq!(stats.completed_sessions, 1);
    assert_eq!(stats.session_history.len(), 1);
    assert_eq!(stats.session_history[0].end_time, Some(target));
    assert!(stats.session_history[0].completed);
    assert_eq!(stats.daily_stat(engine.today()).unwrap().total_focus_secs, 600);
    assert!(matches!(
        engine.recovered(),
        Some(Event::SessionRecovered { .. })
    ));
}

#[test]
fn test_paused_session_is_restored_even_past_its_target() {
    let clock = clock();
    let store = MemoryStore::new();
    {
        let mut engine = FocusEngine::open(store.clone(), clock.clone());
        engine.start_session(SessionKind::Focus, 60);
        clock.advance_secs(20);
        engine.pause_session();
    }

    clock.advance_secs(3600);
    let mut engine = FocusEngine::open(store, clock.clone());
    assert!(engine.current_session().unwrap().is_paused());
    assert_eq!(engine.remaining_secs(), 40);

    engine.resume_session();
    assert_eq!(engine.remaining_secs(), 40);
    assert_eq!(engine.current_session().unwrap().total_paused_ms, 3_600_000);
}

#[test]
fn test_undecodable_documents_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(keys::STATS, "{not json").unwrap();
    store.set(keys::CURRENT_SESSION, "[]").unwrap();
    store.set(keys::SETTINGS, "42").unwrap();

    let engine = FocusEngine::open(store.clone(), clock());
    assert_eq!(engine.stats().total_sessions, 0);
    assert_eq!(engine.stats().achievements.len(), 5);
    assert!(engine.current_session().is_none());
    assert_eq!(engine.settings().theme, Theme::Light);

    // Broken documents are replaced on open.
    assert!(store.get(keys::CURRENT_SESSION).unwrap().is_none());
    let stats: serde_json::Value =
        serde_json::from_str(&store.get(keys::STATS).unwrap().unwrap()).unwrap();
    assert_eq!(stats["total_sessions"], 0);
}

#[test]
fn test_settings_persist_across_restart() {
    let clock = clock();
    let store = MemoryStore::new();
    {
        let mut engine = FocusEngine::open(store.clone(), clock.clone());
        engine.toggle_theme();
        engine.toggle_sound();
        engine.set_preset(SessionKind::Focus, 50);
    }
    let engine = FocusEngine::open(store, clock);
    assert_eq!(engine.settings().theme, Theme::Dark);
    assert!(!engine.settings().sound_enabled);
    assert_eq!(engine.settings().presets.focus, 50);
}

#[test]
fn test_sqlite_store_keeps_history_between_opens() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("focustrack.db");
    let clock = clock();

    {
        let db = Database::open(&path).unwrap();
        let mut engine = FocusEngine::open(db, clock.clone());
        engine.fast_forward_sessions(3, 1500);
        engine.start_session(SessionKind::ShortBreak, 300);
    }

    clock.advance_secs(60);
    let db = Database::open(&path).unwrap();
    let engine = FocusEngine::open(db, clock);
    assert_eq!(engine.stats().completed_sessions, 3);
    assert_eq!(engine.stats().total_sessions, 4);
    assert_eq!(engine.current_session().unwrap().kind, SessionKind::ShortBreak);
    assert_eq!(engine.remaining_secs(), 240);

    let listed = engine.store().kv_keys().unwrap();
    let names: Vec<&str> = listed.iter().map(|k| k.key.as_str()).collect();
    assert_eq!(names, vec!["current_session", "settings", "stats"]);
}

#[test]
fn test_clear_all_starts_fresh() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("focustrack.db");
    let clock = clock();
    {
        let db = Database::open(&path).unwrap();
        let mut engine = FocusEngine::open(db, clock.clone());
        engine.fast_forward_sessions(2, 600);
        engine.toggle_theme();
        engine.store().clear_all().unwrap();
    }

    let engine = FocusEngine::open(Database::open(&path).unwrap(), clock);
    assert_eq!(engine.stats().completed_sessions, 0);
    assert_eq!(engine.settings().theme, Theme::Light);
}
