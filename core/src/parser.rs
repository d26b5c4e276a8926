//! Parsers turn key events into keyword segments.
//!
//! Each schema names the parser it wants; the [`ParserRegistry`] maps that
//! name to a factory and builds one parser instance per engine session. A
//! parser mutates the [`Context`] keywords directly and answers whether it
//! consumed the key. Anything it defers goes through the engine's default
//! handling (navigation, selection, commit).
//!
//! Punctuation is a side channel: [`Parser::check_punct`] tells the engine
//! whether a key maps to a punctuation mark, either a single string to
//! commit or a list of alternatives the user cycles through.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::ZimeError;
use crate::key_event::KeyEvent;
use crate::schema::{strip_brackets, Schema};

/// Outcome of [`Parser::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    /// The key was consumed; no further handling.
    Handled,
    /// The engine should apply its default handling.
    Deferred,
}

/// Punctuation bound to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Punct {
    /// Commit this text right away.
    Commit(String),
    /// Cycle through these forms. An empty list is no punctuation and a
    /// single form is committed directly.
    Cycle(Vec<String>),
}

impl Punct {
    /// `None` for no forms, `Commit` for one, `Cycle` for several.
    pub fn from_forms(mut forms: Vec<String>) -> Option<Self> {
        match forms.len() {
            0 => None,
            1 => forms.pop().map(Punct::Commit),
            _ => Some(Punct::Cycle(forms)),
        }
    }
}

/// Per-schema tokenizer.
pub trait Parser {
    fn process(&mut self, event: &KeyEvent, ctx: &mut Context) -> Processed;

    fn check_punct(&self, event: &KeyEvent) -> Option<Punct>;

    /// Drop buffered state; called on every commit.
    fn clear(&mut self);

    fn name(&self) -> &'static str;
}

pub type ParserFactory =
    Arc<dyn Fn(&Schema) -> Result<Box<dyn Parser>, ZimeError> + Send + Sync>;

/// Name-keyed parser factories.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    factories: HashMap<String, ParserFactory>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the parsers shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(RomanParser::NAME, |schema: &Schema| {
            Ok(Box::new(RomanParser::from_schema(schema)?) as Box<dyn Parser>)
        });
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Schema) -> Result<Box<dyn Parser>, ZimeError> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the parser `schema` asks for.
    pub fn create(&self, schema: &Schema) -> Result<Box<dyn Parser>, ZimeError> {
        let factory = self
            .factories
            .get(schema.parser_name())
            .ok_or_else(|| ZimeError::UnknownParser(schema.parser_name().to_string()))?;
        factory(schema)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parsers", &self.names())
            .finish()
    }
}

// ============================================================================
// RomanParser
// ============================================================================

/// Alphabetic keyword parser.
///
/// Letters from the schema's `Alphabet` extend the open segment, a
/// `Delimiter` key closes it, and `MaxKeywordLength` (if set) starts a new
/// segment once the open one is full. Punctuation comes from `Punct/<char>`
/// config entries: space separated forms, or a bracketed run of single
/// characters such as `[「『]`.
///
/// The parser keeps no input of its own: the open segment in the context
/// is the only record of what was typed, so engine edits such as
/// BackSpace never leave it out of date.
#[derive(Debug, Clone)]
pub struct RomanParser {
    alphabet: Vec<char>,
    delimiter: Vec<char>,
    max_keyword_length: Option<usize>,
    punct: HashMap<char, Punct>,
}

impl RomanParser {
    pub const NAME: &'static str = "roman";

    pub fn from_schema(schema: &Schema) -> Result<Self, ZimeError> {
        let alphabet = schema
            .config_char_sequence("Alphabet")?
            .unwrap_or_else(|| ('a'..='z').collect());
        let delimiter = schema
            .config_char_sequence("Delimiter")?
            .unwrap_or_else(|| vec!['\'']);
        let max_keyword_length = schema.config_usize("MaxKeywordLength")?.filter(|n| *n > 0);

        let mut punct = HashMap::new();
        for (key, value) in schema.config_items("Punct/")? {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    tracing::warn!(schema = schema.name(), key = %key, "ignoring punctuation entry for a multi-char key");
                    continue;
                }
            };
            if let Some(p) = Punct::from_forms(parse_forms(&value)) {
                punct.insert(ch, p);
            }
        }
        tracing::debug!(schema = schema.name(), punct = punct.len(), "roman parser ready");

        Ok(Self {
            alphabet,
            delimiter,
            max_keyword_length,
            punct,
        })
    }

    fn push_letter(&mut self, ch: char, ctx: &mut Context) {
        let max = self.max_keyword_length;
        let keywords = ctx.keywords_mut();
        if keywords.is_empty() {
            keywords.push(String::new());
        }
        let open_full = keywords
            .last()
            .is_some_and(|last| max.is_some_and(|m| last.chars().count() >= m));
        if open_full {
            keywords.push(ch.to_string());
        } else if let Some(last) = keywords.last_mut() {
            last.push(ch);
        }
        ctx.update_keywords();
    }
}

fn parse_forms(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = strip_brackets(trimmed);
    if inner.len() != trimmed.len() {
        inner.chars().map(String::from).collect()
    } else {
        trimmed.split_whitespace().map(String::from).collect()
    }
}

impl Parser for RomanParser {
    fn process(&mut self, event: &KeyEvent, ctx: &mut Context) -> Processed {
        if event.is_release() {
            return Processed::Deferred;
        }
        let Some(ch) = event.char() else {
            return Processed::Deferred;
        };
        if self.alphabet.contains(&ch) {
            self.push_letter(ch, ctx);
            return Processed::Handled;
        }
        if self.delimiter.contains(&ch) && !ctx.is_empty() {
            let keywords = ctx.keywords_mut();
            if keywords.last().is_some_and(|last| !last.is_empty()) {
                keywords.push(String::new());
            }
            ctx.update_keywords();
            return Processed::Handled;
        }
        Processed::Deferred
    }

    fn check_punct(&self, event: &KeyEvent) -> Option<Punct> {
        if event.is_release() {
            return None;
        }
        self.punct.get(&event.char()?).cloned()
    }

    fn clear(&mut self) {}

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
