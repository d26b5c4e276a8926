//! Process-wide state: the opened store and the parser registry.
//!
//! A `Runtime` is built once at startup and handed to every
//! [`crate::SchemaChooser`] and [`crate::Engine`]; there are no globals.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{StoreError, ZimeError};
use crate::parser::ParserRegistry;
use crate::store::{ConfigStore, RedbStore};

#[derive(Clone)]
pub struct Runtime {
    store: Arc<dyn ConfigStore>,
    parsers: ParserRegistry,
}

impl Runtime {
    /// Runtime over `store` with the built-in parsers.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::with_parsers(store, ParserRegistry::with_builtin())
    }

    pub fn with_parsers(store: Arc<dyn ConfigStore>, parsers: ParserRegistry) -> Self {
        Self { store, parsers }
    }

    /// Open the database found by [`DatabaseLocation::from_env`].
    pub fn open_default() -> Result<Self, ZimeError> {
        let store = DatabaseLocation::from_env().open()?;
        Ok(Self::new(store))
    }

    /// Honour an explicit `database` path in `config`, else the default
    /// location.
    pub fn from_config(config: &Config) -> Result<Self, ZimeError> {
        match &config.database {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening configured database");
                Ok(Self::new(Arc::new(RedbStore::create(path)?)))
            }
            None => Self::open_default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    pub fn parsers_mut(&mut self) -> &mut ParserRegistry {
        &mut self.parsers
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("read_only", &self.store.is_read_only())
            .field("parsers", &self.parsers)
            .finish()
    }
}

/// The user's home directory, or `.` when none is known.
pub(crate) fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Which database file to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseChoice {
    /// Writable per-user database (created if missing).
    User(PathBuf),
    /// Shared read-only database shipped with the installation.
    System(PathBuf),
}

/// Where the per-user and system databases live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseLocation {
    pub user_dir: PathBuf,
    pub system_db: Option<PathBuf>,
}

impl DatabaseLocation {
    pub const DB_FILE: &'static str = "zime.db";

    /// `~/.zime` for the user database; `$ZIME_LOCATION/data/zime.db` for
    /// the system one.
    pub fn from_env() -> Self {
        Self {
            user_dir: home_dir().join(".zime"),
            system_db: env::var_os("ZIME_LOCATION")
                .filter(|v| !v.is_empty())
                .map(|base| Path::new(&base).join("data").join(Self::DB_FILE)),
        }
    }

    pub fn user_db(&self) -> PathBuf {
        self.user_dir.join(Self::DB_FILE)
    }

    /// Use the user database if it exists; otherwise fall back to an
    /// existing system database, or a new user database.
    pub fn resolve(&self) -> DatabaseChoice {
        let user_db = self.user_db();
        if !user_db.exists() {
            if let Some(sys) = self.system_db.as_ref().filter(|p| p.exists()) {
                return DatabaseChoice::System(sys.clone());
            }
        }
        DatabaseChoice::User(user_db)
    }

    pub fn open(&self) -> Result<Arc<dyn ConfigStore>, StoreError> {
        match self.resolve() {
            DatabaseChoice::System(path) => {
                tracing::info!(path = %path.display(), "opening system database read-only");
                Ok(Arc::new(RedbStore::open_read_only(path)?))
            }
            DatabaseChoice::User(path) => {
                tracing::info!(path = %path.display(), "opening user database");
                Ok(Arc::new(RedbStore::create(path)?))
            }
        }
    }
}
