//! Error types shared by the composition core.
//!
//! Store failures are kept apart from the higher level `ZimeError` so the
//! engine can degrade (log and continue) on a failed "last used" write while
//! still refusing to build a schema whose parser is not registered.

use thiserror::Error;

/// Failures of a `ConfigStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("store is opened read-only")]
    ReadOnly,

    #[error("store lock poisoned")]
    Poisoned,

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced while building runtimes, schemas and engines.
#[derive(Debug, Error)]
pub enum ZimeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The schema names a parser nobody registered; the schema is unusable.
    #[error("no parser registered under '{0}'")]
    UnknownParser(String),

    #[error("schema '{0}' does not declare a parser")]
    MissingParser(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
