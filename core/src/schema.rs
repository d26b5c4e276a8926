//! Schemas: named configuration bundles read from the store.

use std::fmt;
use std::sync::Arc;

use crate::error::{StoreError, ZimeError};
use crate::store::ConfigStore;

/// A named input scheme. Holds its name, the parser it asks for and the
/// auto-prompt flag; everything else is read lazily from the store.
#[derive(Clone)]
pub struct Schema {
    name: String,
    parser_name: String,
    auto_prompt: bool,
    store: Arc<dyn ConfigStore>,
}

impl Schema {
    /// Load schema `name`. Fails if the schema declares no `Parser`.
    pub fn load(name: &str, store: Arc<dyn ConfigStore>) -> Result<Self, ZimeError> {
        let parser_name = store
            .read_config_value(name, "Parser")?
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ZimeError::MissingParser(name.to_string()))?;
        let auto_prompt = store.read_config_value(name, "AutoPrompt")?.as_deref() == Some("yes");
        tracing::debug!(schema = name, parser = %parser_name, auto_prompt, "schema loaded");
        Ok(Self {
            name: name.to_string(),
            parser_name,
            auto_prompt,
            store,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parser_name(&self) -> &str {
        &self.parser_name
    }

    pub fn auto_prompt(&self) -> bool {
        self.auto_prompt
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn config_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.store.read_config_value(&self.name, key)
    }

    pub fn config_items(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        self.store.read_config_items(&self.name, prefix)
    }

    /// A character-set value such as `Alphabet`. Surrounding `[...]` is
    /// stripped, so `[abc]` and `abc` both read as `a`, `b`, `c`.
    pub fn config_char_sequence(&self, key: &str) -> Result<Option<Vec<char>>, StoreError> {
        Ok(self.config_value(key)?.map(|v| strip_brackets(&v).chars().collect()))
    }

    pub fn config_usize(&self, key: &str) -> Result<Option<usize>, ZimeError> {
        match self.config_value(key)? {
            None => Ok(None),
            Some(v) => v
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ZimeError::InvalidConfig {
                    key: format!("{}/{key}", self.name),
                    value: v,
                }),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("parser_name", &self.parser_name)
            .field("auto_prompt", &self.auto_prompt)
            .finish_non_exhaustive()
    }
}

pub(crate) fn strip_brackets(value: &str) -> &str {
    value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value)
}
