// core/tests/schema_chooser.rs
//
// Integration tests for the schema menu on a redb-backed store.
//
// Tests cover:
// - most recently used schema is chosen at startup
// - menu listing, digit choice and persistence of the choice
// - Escape from the menu restores the engine's composition
// - read-only databases still allow choosing

use std::path::Path;
use std::sync::Arc;

use zime_core::chooser::MENU_TITLE;
use zime_core::{
    keysym, ConfigStore, ModifierMask, RecordingFrontend, RedbStore, Runtime, SchemaChooser,
};

fn seed(path: &Path) {
    let store = RedbStore::create(path).unwrap();
    for (name, display) in [("cangjie", "倉頡"), ("luomazi", "羅馬字"), ("zhuyin", "注音")] {
        store.update_setting(&format!("Schema/{name}"), display).unwrap();
        store.update_config_value(name, "Parser", "roman").unwrap();
    }
    store.update_config_value("luomazi", "AutoPrompt", "yes").unwrap();
    store.add_phrase("luomazi", "ni", "你", 5).unwrap();
    store
        .update_setting("SchemaChooser/LastUsed/cangjie", "1000.5")
        .unwrap();
    store
        .update_setting("SchemaChooser/LastUsed/luomazi", "2000.25")
        .unwrap();
}

fn open(path: &Path) -> Arc<Runtime> {
    Arc::new(Runtime::new(Arc::new(RedbStore::create(path).unwrap())))
}

#[test]
fn most_recent_schema_is_chosen_without_input() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");
    seed(&db);

    let mut fe = RecordingFrontend::new();
    let chooser = SchemaChooser::new(open(&db), &mut fe, None).unwrap();
    assert!(!chooser.is_active());
    assert_eq!(chooser.current_schema(), Some("luomazi"));
}

#[test]
fn menu_lists_by_recency_and_choice_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");
    seed(&db);

    {
        let mut fe = RecordingFrontend::new();
        let mut chooser = SchemaChooser::new(open(&db), &mut fe, None).unwrap();

        assert!(chooser.process_key_event(&mut fe, keysym::GRAVE, ModifierMask::CONTROL));
        assert!(chooser.is_active());
        assert_eq!(fe.aux_text, MENU_TITLE);
        // luomazi was just recorded as used, then cangjie, then never-used zhuyin
        assert_eq!(
            fe.candidates.as_deref().unwrap(),
            ["羅馬字", "倉頡", "注音"]
        );

        assert!(chooser.process_key_event(&mut fe, keysym::from_char('3'), ModifierMask::empty()));
        assert!(!chooser.is_active());
        assert_eq!(chooser.current_schema(), Some("zhuyin"));
        assert!(chooser.schema_list().is_empty());
    }

    let mut fe = RecordingFrontend::new();
    let chooser = SchemaChooser::new(open(&db), &mut fe, None).unwrap();
    assert_eq!(chooser.current_schema(), Some("zhuyin"));
}

#[test]
fn escape_returns_to_the_composition() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");
    seed(&db);

    let mut fe = RecordingFrontend::new();
    let mut chooser = SchemaChooser::new(open(&db), &mut fe, Some("luomazi")).unwrap();
    for ch in "ni".chars() {
        chooser.process_key_event(&mut fe, keysym::from_char(ch), ModifierMask::empty());
    }
    assert_eq!(fe.preedit_text, "ni");

    chooser.process_key_event(&mut fe, keysym::GRAVE, ModifierMask::CONTROL);
    // menu keys never reach the engine
    assert!(chooser.process_key_event(&mut fe, keysym::from_char('x'), ModifierMask::empty()));
    assert!(!chooser.process_key_event(&mut fe, keysym::from_char('X'), ModifierMask::SHIFT));

    assert!(chooser.process_key_event(&mut fe, keysym::ESCAPE, ModifierMask::empty()));
    assert!(!chooser.is_active());
    assert_eq!(fe.preedit_text, "ni");
    assert_eq!(fe.candidates.as_deref().unwrap(), ["你"]);
    assert_eq!(fe.aux_text, "ni");
}

#[test]
fn delegated_hotkeys_pass_to_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");
    seed(&db);

    let mut fe = RecordingFrontend::new();
    let mut chooser = SchemaChooser::new(open(&db), &mut fe, None).unwrap();
    assert!(!chooser.process_key_event(&mut fe, 0x61, ModifierMask::CONTROL));
    assert!(chooser.process_key_event(&mut fe, 0x61, ModifierMask::empty()));
}

#[test]
fn read_only_database_still_chooses() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");
    seed(&db);

    let store = RedbStore::open_read_only(&db).unwrap();
    let rt = Arc::new(Runtime::new(Arc::new(store)));
    let mut fe = RecordingFrontend::new();
    let mut chooser = SchemaChooser::new(rt.clone(), &mut fe, Some("zhuyin")).unwrap();
    assert_eq!(chooser.current_schema(), Some("zhuyin"));

    // the failed "last used" write leaves the old order in place
    chooser.process_key_event(&mut fe, keysym::GRAVE, ModifierMask::CONTROL);
    assert_eq!(chooser.schema_list()[0].schema, "luomazi");
    assert!(rt.store().read_setting("SchemaChooser/LastUsed/zhuyin").unwrap().is_none());
}
