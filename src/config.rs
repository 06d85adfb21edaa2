//! Storage configuration.

use std::path::{Path, PathBuf};

/// Database file used when no `--db` path is given.
pub const DEFAULT_DB_FILE: &str = "tasks.json";

/// Where the task collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

impl Config {
    /// Use `db` when given, otherwise the default file in the current directory.
    pub fn from_db_arg(db: Option<PathBuf>) -> Self {
        match db {
            Some(db_path) => Config { db_path },
            None => Config::default(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
