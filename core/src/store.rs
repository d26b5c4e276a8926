//! Configuration and dictionary storage.
//!
//! A single store holds three kinds of records:
//! - per-schema config values (`Parser`, `AutoPrompt`, `Punct/,` ...),
//! - global settings (`Schema/<name>` menu entries, `SchemaChooser/LastUsed/<name>`),
//! - the phrase table consulted by [`crate::TableModel`].
//!
//! Two backends are provided: `MemoryStore` for tests and demos, and the
//! persistent `RedbStore`. Both are safe to share behind an `Arc`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A phrase-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub text: String,
    pub freq: u64,
}

/// Backing store consumed by schemas, the schema menu and the table model.
///
/// `read_setting_items` and `read_config_items` return keys with the prefix
/// stripped, in key order.
pub trait ConfigStore: Send + Sync {
    fn read_config_value(&self, schema: &str, key: &str) -> Result<Option<String>, StoreError>;

    fn read_config_items(
        &self,
        schema: &str,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, StoreError>;

    fn update_config_value(&self, schema: &str, key: &str, value: &str) -> Result<(), StoreError>;

    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn read_setting_items(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError>;

    fn update_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Phrases stored under `key`, most frequent first.
    fn lookup_phrases(&self, schema: &str, key: &str) -> Result<Vec<Phrase>, StoreError>;

    /// All phrases of a schema as `(key, phrase)` pairs.
    fn phrase_items(&self, schema: &str) -> Result<Vec<(String, Phrase)>, StoreError>;

    fn add_phrase(&self, schema: &str, key: &str, text: &str, freq: u64)
        -> Result<(), StoreError>;

    /// Record one use of a phrase (saturating increment).
    fn learn_phrase(&self, schema: &str, key: &str, text: &str) -> Result<(), StoreError>;

    fn is_read_only(&self) -> bool {
        false
    }
}

fn config_key(schema: &str, key: &str) -> String {
    format!("{schema}/{key}")
}

fn phrase_prefix(schema: &str, key: &str) -> String {
    format!("{schema}\t{key}\t")
}

fn sort_by_frequency(phrases: &mut [Phrase]) {
    // stable: ties keep table order
    phrases.sort_by(|a, b| b.freq.cmp(&a.freq));
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store guarded by `RwLock`s.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: RwLock<BTreeMap<String, String>>,
    settings: RwLock<BTreeMap<String, String>>,
    phrases: RwLock<BTreeMap<String, u64>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the store: every later write fails with `StoreError::ReadOnly`.
    pub fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn scan<V: Clone>(map: &BTreeMap<String, V>, prefix: &str) -> Vec<(String, V)> {
        map.range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k[prefix.len()..].to_string(), v.clone()))
            .collect()
    }
}

impl ConfigStore for MemoryStore {
    fn read_config_value(&self, schema: &str, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.config.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&config_key(schema, key)).cloned())
    }

    fn read_config_items(
        &self,
        schema: &str,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        let map = self.config.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Self::scan(&map, &config_key(schema, prefix)))
    }

    fn update_config_value(&self, schema: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.config.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(config_key(schema, key), value.to_string());
        Ok(())
    }

    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.settings.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn read_setting_items(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        let map = self.settings.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Self::scan(&map, prefix))
    }

    fn update_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.settings.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn lookup_phrases(&self, schema: &str, key: &str) -> Result<Vec<Phrase>, StoreError> {
        let map = self.phrases.read().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<Phrase> = Self::scan(&map, &phrase_prefix(schema, key))
            .into_iter()
            .map(|(text, freq)| Phrase { text, freq })
            .collect();
        sort_by_frequency(&mut out);
        Ok(out)
    }

    fn phrase_items(&self, schema: &str) -> Result<Vec<(String, Phrase)>, StoreError> {
        let map = self.phrases.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Self::scan(&map, &format!("{schema}\t"))
            .into_iter()
            .filter_map(|(rest, freq)| {
                let (key, text) = rest.split_once('\t')?;
                Some((key.to_string(), Phrase { text: text.to_string(), freq }))
            })
            .collect())
    }

    fn add_phrase(
        &self,
        schema: &str,
        key: &str,
        text: &str,
        freq: u64,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.phrases.write().map_err(|_| StoreError::Poisoned)?;
        let entry = map.entry(format!("{}{text}", phrase_prefix(schema, key))).or_insert(0);
        *entry = entry.saturating_add(freq);
        Ok(())
    }

    fn learn_phrase(&self, schema: &str, key: &str, text: &str) -> Result<(), StoreError> {
        self.add_phrase(schema, key, text, 1)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

// ============================================================================
// RedbStore
// ============================================================================

/// Persistent store backed by a single redb database file.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
    read_only: bool,
}

impl RedbStore {
    const CONFIG: TableDefinition<'static, &'static str, &'static str> =
        TableDefinition::new("config");
    const SETTINGS: TableDefinition<'static, &'static str, &'static str> =
        TableDefinition::new("settings");
    const PHRASES: TableDefinition<'static, &'static str, u64> = TableDefinition::new("phrases");

    /// Create or open a writable database at `path`, creating parent
    /// directories and all tables as needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(redb::Error::from)?;
        let store = Self {
            db,
            path: path.to_path_buf(),
            read_only: false,
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Open an existing database; writes are refused.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = Database::open(path).map_err(redb::Error::from)?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
            read_only: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_tables(&self) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            txn.open_table(Self::CONFIG)?;
            txn.open_table(Self::SETTINGS)?;
            txn.open_table(Self::PHRASES)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn get_str(
        &self,
        def: TableDefinition<&'static str, &'static str>,
        key: &str,
    ) -> Result<Option<String>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(def) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn scan_str(
        &self,
        def: TableDefinition<&'static str, &'static str>,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(def) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for item in table.range(prefix..)? {
            let (k, v) = item?;
            let key = k.value();
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key[prefix.len()..].to_string(), v.value().to_string()));
        }
        Ok(out)
    }

    fn put_str(
        &self,
        def: TableDefinition<&'static str, &'static str>,
        key: &str,
        value: &str,
    ) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(def)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn scan_phrases(&self, prefix: &str) -> Result<Vec<(String, u64)>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(Self::PHRASES) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for item in table.range(prefix..)? {
            let (k, v) = item?;
            let key = k.value();
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key[prefix.len()..].to_string(), v.value()));
        }
        Ok(out)
    }

    fn bump_phrase(&self, full_key: &str, delta: u64) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(Self::PHRASES)?;
            let current = table.get(full_key)?.map(|guard| guard.value()).unwrap_or(0);
            table.insert(full_key, current.saturating_add(delta))?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl ConfigStore for RedbStore {
    fn read_config_value(&self, schema: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_str(Self::CONFIG, &config_key(schema, key))?)
    }

    fn read_config_items(
        &self,
        schema: &str,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.scan_str(Self::CONFIG, &config_key(schema, prefix))?)
    }

    fn update_config_value(&self, schema: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        Ok(self.put_str(Self::CONFIG, &config_key(schema, key), value)?)
    }

    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_str(Self::SETTINGS, key)?)
    }

    fn read_setting_items(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.scan_str(Self::SETTINGS, prefix)?)
    }

    fn update_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        Ok(self.put_str(Self::SETTINGS, key, value)?)
    }

    fn lookup_phrases(&self, schema: &str, key: &str) -> Result<Vec<Phrase>, StoreError> {
        let mut out: Vec<Phrase> = self
            .scan_phrases(&phrase_prefix(schema, key))?
            .into_iter()
            .map(|(text, freq)| Phrase { text, freq })
            .collect();
        sort_by_frequency(&mut out);
        Ok(out)
    }

    fn phrase_items(&self, schema: &str) -> Result<Vec<(String, Phrase)>, StoreError> {
        let schema_prefix = format!("{schema}\t");
        Ok(self
            .scan_phrases(&schema_prefix)?
            .into_iter()
            .filter_map(|(rest, freq)| {
                let (key, text) = rest.split_once('\t')?;
                Some((key.to_string(), Phrase { text: text.to_string(), freq }))
            })
            .collect())
    }

    fn add_phrase(
        &self,
        schema: &str,
        key: &str,
        text: &str,
        freq: u64,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        Ok(self.bump_phrase(&format!("{}{text}", phrase_prefix(schema, key)), freq)?)
    }

    fn learn_phrase(&self, schema: &str, key: &str, text: &str) -> Result<(), StoreError> {
        self.add_phrase(schema, key, text, 1)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
