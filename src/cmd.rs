//! Command implementations for the CLI interface.
//!
//! Each handler loads the collection, finds or mutates tasks, saves when something
//! changed, and writes one result line per outcome to `out`. A missing id is reported
//! on `out` and is not an error; storage failures propagate to the caller.

use std::io::Write;

use clap::builder::NonEmptyStringValueParser;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::db::{format_task_line, Store};
use crate::error::{Error, Result};
use crate::fields::Status;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Task description.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        description: String,
    },

    /// Update an existing task.
    Update {
        /// Task ID.
        id: u64,
        /// New task description.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        description: String,
    },

    /// Delete an existing task.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Mark a task as in-progress.
    MarkInProgress {
        /// Task ID.
        id: u64,
    },

    /// Mark a task as done.
    MarkDone {
        /// Task ID.
        id: u64,
    },

    /// Move a task back to todo.
    MarkTodo {
        /// Task ID.
        id: u64,
    },

    /// List tasks, optionally only those with one status.
    List {
        /// Filter by status: todo | in-progress | done.
        #[arg(value_enum)]
        status: Option<Status>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dispatch one parsed command.
pub fn run<W: Write>(command: Commands, store: &Store, out: &mut W) -> Result<()> {
    debug!(db = %store.path().display(), "dispatching command");
    match command {
        Commands::Add { description } => cmd_add(store, out, description),
        Commands::Update { id, description } => cmd_update(store, out, id, description),
        Commands::Delete { id } => cmd_delete(store, out, id),
        Commands::MarkInProgress { id } => cmd_mark(store, out, id, Status::InProgress),
        Commands::MarkDone { id } => cmd_mark(store, out, id, Status::Done),
        Commands::MarkTodo { id } => cmd_mark(store, out, id, Status::Todo),
        Commands::List { status } => cmd_list(store, out, status),
        Commands::Completions { shell } => cmd_completions(out, shell),
    }
}

/// Add a new task to the database.
pub fn cmd_add<W: Write>(store: &Store, out: &mut W, description: String) -> Result<()> {
    let mut db = store.load()?;
    let id = db.add(description)?;
    store.save(&db)?;
    info!(id, "task added");
    writeln!(out, "Task added successfully (ID: {})", id)?;
    Ok(())
}

/// Replace a task's description.
pub fn cmd_update<W: Write>(
    store: &Store,
    out: &mut W,
    id: u64,
    description: String,
) -> Result<()> {
    let mut db = store.load()?;
    let Some(t) = db.get_mut(id) else {
        return report(out, Error::NotFound(id));
    };
    t.set_description(description);
    store.save(&db)?;
    info!(id, "task updated");
    writeln!(out, "Task {} updated successfully.", id)?;
    Ok(())
}

/// Delete a task by ID.
pub fn cmd_delete<W: Write>(store: &Store, out: &mut W, id: u64) -> Result<()> {
    let mut db = store.load()?;
    if db.remove(id).is_none() {
        return report(out, Error::NotFound(id));
    }
    store.save(&db)?;
    info!(id, "task deleted");
    writeln!(out, "Task {} deleted successfully.", id)?;
    Ok(())
}

/// Set a task's status.
pub fn cmd_mark<W: Write>(store: &Store, out: &mut W, id: u64, status: Status) -> Result<()> {
    let mut db = store.load()?;
    let Some(t) = db.get_mut(id) else {
        return report(out, Error::NotFound(id));
    };
    t.set_status(status);
    store.save(&db)?;
    info!(id, %status, "task status changed");
    writeln!(out, "Task {} marked as {}.", id, status)?;
    Ok(())
}

/// Set a task's status from its string form. An unknown status is rejected before the
/// database is read.
pub fn mark_status<W: Write>(store: &Store, out: &mut W, id: u64, status: &str) -> Result<()> {
    match status.parse::<Status>() {
        Ok(status) => cmd_mark(store, out, id, status),
        Err(e) => report(out, e),
    }
}

/// Print tasks in collection order, optionally filtered by status.
pub fn cmd_list<W: Write>(store: &Store, out: &mut W, status: Option<Status>) -> Result<()> {
    let db = store.load()?;
    for t in db.filter(status) {
        writeln!(out, "{}", format_task_line(t))?;
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions<W: Write>(out: &mut W, shell: Shell) -> Result<()> {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, out);
    Ok(())
}

/// Print a recoverable failure (unknown id or status) and carry on.
fn report<W: Write>(out: &mut W, err: Error) -> Result<()> {
    debug!(%err, "command had no effect");
    writeln!(out, "{}", err)?;
    Ok(())
}
