// tools/tests/demo_session.rs
//
// End-to-end: import the demo schema file into a fresh redb database and
// drive a console session over it.

use std::path::PathBuf;
use std::sync::Arc;

use zime_core::{ConfigStore, RecordingFrontend, RedbStore, Runtime, SchemaChooser};
use zime_tools::console;
use zime_tools::schema_file::SchemaFile;

fn demo_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("data")
        .join("demo_schema.toml")
}

fn type_line(chooser: &mut SchemaChooser, fe: &mut RecordingFrontend, line: &str) {
    for (keycode, mask) in console::parse_line(line).unwrap() {
        chooser.process_key_event(fe, keycode, mask);
    }
}

#[test]
fn demo_schema_round_trip_session() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("zime.db");

    let file = SchemaFile::load(demo_file()).unwrap();
    let store = Arc::new(RedbStore::create(&db).unwrap());
    let stats = file.import_into(store.as_ref()).unwrap();
    assert_eq!(stats.schemas, 2);

    let runtime = Arc::new(Runtime::new(store.clone()));
    let mut fe = RecordingFrontend::new();
    let mut chooser = SchemaChooser::new(runtime, &mut fe, Some("luomazi")).unwrap();

    type_line(&mut chooser, &mut fe, "ni'hao");
    assert_eq!(console::render(&fe), "preedit: ni[hao]\naux: hao\ncandidates (1/1): 1.好 2.號\n");

    type_line(&mut chooser, &mut fe, "Home 1");
    assert_eq!(fe.preedit_text, "你好");

    type_line(&mut chooser, &mut fe, "space");
    assert_eq!(fe.take_commit(), "你好");

    let learned = store.lookup_phrases("luomazi", "ni hao").unwrap();
    assert_eq!(learned[0].freq, 81);

    // cycling punctuation then a letter
    type_line(&mut chooser, &mut fe, ". . ma");
    assert_eq!(fe.take_commit(), "．");
    assert_eq!(fe.preedit_text, "ma");
}

#[test]
fn export_reproduces_the_demo_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbStore::create(dir.path().join("zime.db")).unwrap();
    let file = SchemaFile::load(demo_file()).unwrap();
    file.import_into(&store).unwrap();

    let exported = SchemaFile::export_from(&store).unwrap();
    let names: Vec<&str> = exported.schemas.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["cangjie", "luomazi"]);
    let luomazi = &exported.schemas[1];
    assert_eq!(luomazi.config.get("AutoPrompt").map(String::as_str), Some("yes"));
    assert_eq!(luomazi.phrases.len(), 10);

    let reparsed = SchemaFile::parse(&exported.to_toml_string().unwrap()).unwrap();
    assert_eq!(reparsed, exported);
}
