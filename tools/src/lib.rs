//! Shared pieces of the zime command-line tools.
//!
//! - `logging`: tracing subscriber setup for every binary
//! - `schema_file`: TOML schema definitions, imported into and exported from a store
//! - `console`: key token parsing and state rendering for `zime_console`

pub mod console;
pub mod logging;
pub mod schema_file;
