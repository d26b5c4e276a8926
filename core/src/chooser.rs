//! Schema selection menu in front of the engine.
//!
//! The chooser either delegates keys to its current [`Engine`] or shows the
//! list of installed schemas, most recently used first, as candidates.
//! Control+grave opens the menu; a digit picks a schema; Escape returns to
//! the engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::Engine;
use crate::error::ZimeError;
use crate::frontend::Frontend;
use crate::key_event::ModifierMask;
use crate::keysym;
use crate::runtime::Runtime;

/// Status shown when no schema is installed.
pub const NO_SCHEMA: &str = "無方案";
/// Status shown while the menu is open.
pub const MENU_TITLE: &str = "方案選單";

const SCHEMA_PREFIX: &str = "Schema/";
const LAST_USED_PREFIX: &str = "SchemaChooser/LastUsed/";

/// A menu entry: `Schema/<schema>` = `<display_name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub display_name: String,
    pub schema: String,
}

pub struct SchemaChooser {
    runtime: Arc<Runtime>,
    active: bool,
    schema_list: Vec<SchemaEntry>,
    engine: Option<Engine>,
}

impl SchemaChooser {
    /// Load the schema list and choose `schema_name`, or the most recently
    /// used schema. With no schema installed the menu stays open and shows
    /// [`NO_SCHEMA`]; a chosen schema without a parser opens the menu so
    /// another one can be picked. An unregistered parser name is an error.
    pub fn new(
        runtime: Arc<Runtime>,
        fe: &mut dyn Frontend,
        schema_name: Option<&str>,
    ) -> Result<Self, ZimeError> {
        let mut chooser = Self {
            runtime,
            active: true,
            schema_list: Vec::new(),
            engine: None,
        };
        chooser.load_schema_list();
        match chooser.choose(fe, schema_name) {
            Ok(()) => {}
            Err(ZimeError::MissingParser(schema)) => {
                tracing::warn!(schema = %schema, "schema declares no parser; opening the menu");
                chooser.activate(fe);
            }
            Err(e) => return Err(e),
        }
        Ok(chooser)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    /// Entries of the open menu; empty while delegating.
    pub fn schema_list(&self) -> &[SchemaEntry] {
        &self.schema_list
    }

    pub fn current_schema(&self) -> Option<&str> {
        self.engine.as_ref().map(|e| e.schema().name())
    }

    fn reset(&mut self) {
        self.active = true;
        self.schema_list.clear();
        self.engine = None;
    }

    /// Read `Schema/*` and order it by the `LastUsed` timestamps, newest
    /// first; ties keep store order.
    fn load_schema_list(&mut self) {
        let store = self.runtime.store();
        let schemas = store.read_setting_items(SCHEMA_PREFIX).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read schema list");
            Vec::new()
        });
        let last_used: HashMap<String, f64> = store
            .read_setting_items(LAST_USED_PREFIX)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(schema, ts)| Some((schema, ts.trim().parse().ok()?)))
            .collect();
        let used_at = |entry: &SchemaEntry| last_used.get(&entry.schema).copied().unwrap_or(0.0);

        let mut list: Vec<SchemaEntry> = schemas
            .into_iter()
            .map(|(schema, display_name)| SchemaEntry {
                display_name,
                schema,
            })
            .collect();
        list.sort_by(|a, b| used_at(b).total_cmp(&used_at(a)));
        self.schema_list = list;
    }

    /// Switch to `schema_name` (first menu entry if absent or unknown).
    pub fn choose(&mut self, fe: &mut dyn Frontend, schema_name: Option<&str>) -> Result<(), ZimeError> {
        let index = schema_name
            .and_then(|name| self.schema_list.iter().position(|e| e.schema == name))
            .or(if self.schema_list.is_empty() { None } else { Some(0) });
        let Some(index) = index else {
            tracing::warn!("no schema installed");
            fe.update_aux_string(NO_SCHEMA);
            self.reset();
            return Ok(());
        };

        let schema = self.schema_list[index].schema.clone();
        let engine = Engine::new(&self.runtime, &schema, fe)?;
        self.record_last_used(&schema);
        tracing::info!(schema = %schema, "schema chosen");

        self.active = false;
        self.schema_list.clear();
        self.engine = Some(engine);
        Ok(())
    }

    fn record_last_used(&self, schema: &str) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let key = format!("{LAST_USED_PREFIX}{schema}");
        if let Err(e) = self.runtime.store().update_setting(&key, &now.to_string()) {
            tracing::warn!(schema, error = %e, "could not record schema use");
        }
    }

    fn activate(&mut self, fe: &mut dyn Frontend) {
        self.active = true;
        self.load_schema_list();
        let labels: Vec<String> = self
            .schema_list
            .iter()
            .map(|e| e.display_name.clone())
            .collect();
        fe.update_aux_string(MENU_TITLE);
        fe.update_candidates(Some(&labels));
    }

    /// Returns true when the key was consumed.
    pub fn process_key_event(&mut self, fe: &mut dyn Frontend, keycode: u32, mask: ModifierMask) -> bool {
        if !self.active {
            if keycode == keysym::GRAVE && mask.contains(ModifierMask::CONTROL) {
                self.activate(fe);
                return true;
            }
            return match self.engine.as_mut() {
                Some(engine) => engine.process_key_event(fe, keycode, mask),
                None => false,
            };
        }

        if mask.intersects(ModifierMask::SHIFT | ModifierMask::HOTKEYS) {
            return false;
        }
        if mask.contains(ModifierMask::RELEASE) {
            return true;
        }
        match keycode {
            keysym::ESCAPE => {
                self.active = false;
                if let Some(engine) = &self.engine {
                    engine.update_ui(fe);
                }
            }
            keysym::PAGE_UP | keysym::UP | keysym::MINUS | keysym::COMMA => {
                fe.page_up();
            }
            keysym::PAGE_DOWN | keysym::DOWN | keysym::EQUAL | keysym::PERIOD => {
                fe.page_down();
            }
            keysym::KEY_1..=keysym::KEY_9 => {
                let index = fe.candidate_index((keycode - keysym::KEY_1) as usize);
                if let Some(entry) = self.schema_list.get(index) {
                    let schema = entry.schema.clone();
                    if let Err(e) = self.choose(fe, Some(&schema)) {
                        tracing::error!(schema = %schema, error = %e, "schema unusable");
                    }
                }
            }
            _ => {}
        }
        true
    }
}

impl std::fmt::Debug for SchemaChooser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaChooser")
            .field("active", &self.active)
            .field("schema_list", &self.schema_list)
            .field("engine", &self.engine)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::RecordingFrontend;
    use crate::parser::{Parser, RomanParser};
    use crate::schema::Schema;
    use crate::store::{ConfigStore, MemoryStore};

    fn store_with(schemas: &[(&str, &str, Option<f64>)]) -> MemoryStore {
        let store = MemoryStore::new();
        for (name, display, used) in schemas {
            store.update_setting(&format!("Schema/{name}"), display).unwrap();
            store.update_config_value(name, "Parser", "roman").unwrap();
            if let Some(ts) = used {
                store
                    .update_setting(&format!("SchemaChooser/LastUsed/{name}"), &ts.to_string())
                    .unwrap();
            }
        }
        store
    }

    fn runtime(store: MemoryStore) -> Arc<Runtime> {
        Arc::new(Runtime::new(Arc::new(store)))
    }

    #[test]
    fn empty_store_shows_no_schema() {
        let mut fe = RecordingFrontend::new();
        let mut chooser = SchemaChooser::new(runtime(MemoryStore::new()), &mut fe, None).unwrap();
        assert!(chooser.is_active());
        assert!(chooser.engine().is_none());
        assert_eq!(fe.aux_text, NO_SCHEMA);
        // menu swallows plain keys, rejects modified ones
        assert!(chooser.process_key_event(&mut fe, 0x61, ModifierMask::empty()));
        assert!(!chooser.process_key_event(&mut fe, 0x41, ModifierMask::SHIFT));
    }

    #[test]
    fn ties_keep_store_order() {
        let store = store_with(&[("alpha", "Alpha", None), ("beta", "Beta", None)]);
        let mut fe = RecordingFrontend::new();
        let chooser = SchemaChooser::new(runtime(store), &mut fe, None).unwrap();
        assert_eq!(chooser.current_schema(), Some("alpha"));
    }

    #[test]
    fn explicit_name_wins_over_recency() {
        let store = store_with(&[("alpha", "Alpha", Some(5.0)), ("beta", "Beta", Some(1.0))]);
        let mut fe = RecordingFrontend::new();
        let chooser = SchemaChooser::new(runtime(store), &mut fe, Some("beta")).unwrap();
        assert_eq!(chooser.current_schema(), Some("beta"));

        let store = store_with(&[("alpha", "Alpha", Some(5.0))]);
        let chooser = SchemaChooser::new(runtime(store), &mut fe, Some("missing")).unwrap();
        assert_eq!(chooser.current_schema(), Some("alpha"));
    }

    #[test]
    fn unregistered_parser_fails_construction() {
        let store = MemoryStore::new();
        store.update_setting("Schema/stroke", "Stroke").unwrap();
        store.update_config_value("stroke", "Parser", "stroke").unwrap();
        let mut fe = RecordingFrontend::new();
        assert!(matches!(
            SchemaChooser::new(runtime(store), &mut fe, None),
            Err(ZimeError::UnknownParser(_))
        ));
    }

    #[test]
    fn schema_without_parser_opens_the_menu() {
        let store = store_with(&[("good", "Good", Some(1.0))]);
        store.update_setting("Schema/broken", "Broken").unwrap();
        store
            .update_setting("SchemaChooser/LastUsed/broken", "9.0")
            .unwrap();

        let mut fe = RecordingFrontend::new();
        let mut chooser = SchemaChooser::new(runtime(store), &mut fe, None).unwrap();
        assert!(chooser.is_active());
        assert!(chooser.engine().is_none());
        assert_eq!(fe.aux_text, MENU_TITLE);
        assert_eq!(fe.candidates.as_deref().unwrap(), ["Broken", "Good"]);

        // picking the broken entry again keeps the menu open
        assert!(chooser.process_key_event(&mut fe, keysym::KEY_1, ModifierMask::empty()));
        assert!(chooser.is_active());
        assert!(chooser.process_key_event(&mut fe, keysym::KEY_2, ModifierMask::empty()));
        assert!(!chooser.is_active());
        assert_eq!(chooser.current_schema(), Some("good"));
    }

    #[test]
    fn registering_a_parser_makes_its_schema_usable() {
        let store = MemoryStore::new();
        store.update_setting("Schema/stroke", "Stroke").unwrap();
        store.update_config_value("stroke", "Parser", "stroke").unwrap();
        let mut rt = Runtime::new(Arc::new(store));
        rt.parsers_mut().register("stroke", |schema: &Schema| {
            Ok(Box::new(RomanParser::from_schema(schema)?) as Box<dyn Parser>)
        });

        let mut fe = RecordingFrontend::new();
        let chooser = SchemaChooser::new(Arc::new(rt), &mut fe, None).unwrap();
        assert_eq!(chooser.current_schema(), Some("stroke"));
    }

    #[test]
    fn release_is_swallowed_in_menu() {
        let store = store_with(&[("alpha", "Alpha", None)]);
        let mut fe = RecordingFrontend::new();
        let mut chooser = SchemaChooser::new(runtime(store), &mut fe, None).unwrap();
        assert!(chooser.process_key_event(&mut fe, keysym::GRAVE, ModifierMask::CONTROL));
        assert!(chooser.is_active());
        assert!(chooser.process_key_event(&mut fe, keysym::KEY_1, ModifierMask::RELEASE));
        assert!(chooser.is_active());
    }
}
