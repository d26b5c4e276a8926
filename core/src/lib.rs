//! zime-core
//!
//! Composition core of the Zime input method. Raw key events come in, a
//! segmented preedit with per-segment candidates is maintained, and finished
//! text is committed through a frontend callback interface.
//!
//! Public API:
//! - `KeyEvent`, `ModifierMask`, `keysym` - key events in IBus terms
//! - `ConfigStore`, `RedbStore`, `MemoryStore` - schema config, settings and phrases
//! - `Schema` - a named configuration bundle
//! - `Parser`, `ParserRegistry`, `RomanParser` - per-schema tokenizers
//! - `Model`, `TableModel` - candidate generation and learning
//! - `Context` - the composition buffer and its cursor rules
//! - `Engine` - per-session key dispatch with punctuation cycling
//! - `SchemaChooser` - schema menu in front of the engine
//! - `Frontend`, `RecordingFrontend`, `LookupTable` - the UI boundary
//! - `Runtime`, `Config` - process bootstrap

pub mod error;
pub use error::{StoreError, ZimeError};

pub mod keysym;

pub mod key_event;
pub use key_event::{KeyEvent, ModifierMask};

pub mod store;
pub use store::{ConfigStore, MemoryStore, Phrase, RedbStore};

pub mod schema;
pub use schema::Schema;

pub mod model;
pub use model::{Candidate, Model, Selection, TableModel};

pub mod context;
pub use context::{Composition, Context, Render, SelectError, Selected};

pub mod parser;
pub use parser::{Parser, ParserFactory, ParserRegistry, Processed, Punct, RomanParser};

pub mod frontend;
pub use frontend::{preedit_highlight, Frontend, LookupTable, PreeditRun, PreeditStyle, RecordingFrontend};

pub mod engine;
pub use engine::Engine;

pub mod chooser;
pub use chooser::{SchemaChooser, SchemaEntry};

pub mod runtime;
pub use runtime::{DatabaseChoice, DatabaseLocation, Runtime};

pub mod config;
pub use config::Config;
