//! Error types for task storage and command dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the tracker.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No task carries the requested id.
    #[error("Task with ID {0} not found.")]
    NotFound(u64),

    /// Status string outside `todo`, `in-progress`, `done`.
    #[error("Invalid status '{0}'. Use 'todo', 'in-progress', or 'done'.")]
    InvalidStatus(String),

    /// The highest id in the collection is already `u64::MAX`.
    #[error("no task ids left: the highest id is already {}", u64::MAX)]
    IdSpaceExhausted,

    #[error("failed to read task database {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The database file is not a well-formed task array.
    #[error("failed to parse task database {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parsed but breaks a collection invariant.
    #[error("invalid task database {path}: {message}")]
    InvalidData { path: PathBuf, message: String },

    #[error("failed to write task database {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
