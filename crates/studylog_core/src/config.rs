//! Store and logging configuration.
//!
//! # Responsibility
//! - Describe which backend a process should use and how logging starts.
//! - Build a boxed `StudyLogStore` from that description.
//!
//! # Invariants
//! - Every field has a default, so an empty document is a valid config
//!   (in-memory backend, no file logging).

use crate::logging::default_log_level;
use crate::store::{
    MemoryStoreConfig, MemoryStudyLogStore, SqliteStudyLogStore, StoreResult, StudyLogStore,
};
use log::info;
use serde::Deserialize;
use std::path::PathBuf;

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Memory {
        #[serde(default)]
        reset_sequence_on_clear: bool,
    },
    Sqlite {
        path: PathBuf,
    },
    SqliteInMemory,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Memory {
            reset_sequence_on_clear: false,
        }
    }
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Sqlite { .. } => "sqlite",
            Self::SqliteInMemory => "sqlite_in_memory",
        }
    }
}

/// File logging options consumed by `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level_string")]
    pub level: String,
    /// Must be absolute.
    pub log_dir: PathBuf,
}

impl LogConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    pub logging: Option<LogConfig>,
}

/// Opens the configured backend.
///
/// # Errors
/// - Database open/migration failures for SQLite backends.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn StudyLogStore>> {
    let store: Box<dyn StudyLogStore> = match &config.backend {
        BackendConfig::Memory {
            reset_sequence_on_clear,
        } => Box::new(MemoryStudyLogStore::with_config(MemoryStoreConfig {
            reset_sequence_on_clear: *reset_sequence_on_clear,
        })),
        BackendConfig::Sqlite { path } => Box::new(SqliteStudyLogStore::open(path)?),
        BackendConfig::SqliteInMemory => Box::new(SqliteStudyLogStore::open_in_memory()?),
    };

    info!(
        "event=store_open module=config status=ok backend={}",
        config.backend.name()
    );
    Ok(store)
}
