//! Schema definition files.
//!
//! ```toml
//! [[schema]]
//! name = "luomazi"
//! display_name = "羅馬字"
//! config = { Parser = "roman", AutoPrompt = "yes", "Punct/." = "。 ．" }
//!
//! [[schema.phrase]]
//! key = "ni hao"
//! text = "你好"
//! freq = 12
//! ```
//!
//! Importing writes the `Schema/<name>` menu entry, every config pair and the
//! phrases into a store. Exporting reads the same shape back out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use zime_core::ConfigStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaFile {
    #[serde(default, rename = "schema")]
    pub schemas: Vec<SchemaDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaDef {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default, rename = "phrase")]
    pub phrases: Vec<PhraseDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PhraseDef {
    pub key: String,
    pub text: String,
    #[serde(default = "default_freq")]
    pub freq: u64,
}

fn default_freq() -> u64 {
    1
}

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub schemas: usize,
    pub config_values: usize,
    pub phrases: usize,
}

impl SchemaFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid schema file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        for def in &self.schemas {
            if def.name.is_empty() || def.name.contains('/') {
                bail!("invalid schema name {:?}", def.name);
            }
            if !def.config.contains_key("Parser") {
                bail!("schema '{}' does not declare a Parser", def.name);
            }
            if let Some(p) = def.phrases.iter().find(|p| p.key.contains('\t') || p.text.contains('\t')) {
                bail!("schema '{}': tab in phrase {:?}", def.name, p.text);
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write every schema into `store`. Phrase frequencies add to existing
    /// entries.
    pub fn import_into(&self, store: &dyn ConfigStore) -> Result<ImportStats> {
        let mut stats = ImportStats::default();
        for def in &self.schemas {
            store
                .update_setting(&format!("Schema/{}", def.name), &def.display_name)
                .with_context(|| format!("failed to register schema '{}'", def.name))?;
            for (key, value) in &def.config {
                store.update_config_value(&def.name, key, value)?;
                stats.config_values += 1;
            }
            for phrase in &def.phrases {
                store.add_phrase(&def.name, &phrase.key, &phrase.text, phrase.freq)?;
                stats.phrases += 1;
            }
            tracing::info!(schema = %def.name, phrases = def.phrases.len(), "schema imported");
            stats.schemas += 1;
        }
        Ok(stats)
    }

    /// Read all registered schemas back out of `store`.
    pub fn export_from(store: &dyn ConfigStore) -> Result<Self> {
        let mut schemas = Vec::new();
        for (name, display_name) in store.read_setting_items("Schema/")? {
            let config = store.read_config_items(&name, "")?.into_iter().collect();
            let phrases = store
                .phrase_items(&name)?
                .into_iter()
                .map(|(key, p)| PhraseDef {
                    key,
                    text: p.text,
                    freq: p.freq,
                })
                .collect();
            schemas.push(SchemaDef {
                name,
                display_name,
                config,
                phrases,
            });
        }
        Ok(Self { schemas })
    }
}
