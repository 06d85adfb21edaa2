//! # task-cli - Task Tracker CLI
//!
//! A small command-line task tracker. Tasks live in a local JSON file (`./tasks.json`
//! unless `--db` points elsewhere) that is read at the start of every command and
//! rewritten in full whenever a command changes something.
//!
//! ## Quick Start
//!
//! ```bash
//! task-cli add "Buy groceries"
//! task-cli update 1 "Buy groceries and cook dinner"
//! task-cli mark-in-progress 1
//! task-cli mark-done 1
//! task-cli list
//! task-cli list done
//! task-cli delete 1
//! ```
//!
//! Statuses are `todo`, `in-progress` and `done`; any status can move to any other.
//! Log output goes to stderr and is controlled by `RUST_LOG` or `--verbose`.

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod task;

use cli::Cli;
use config::Config;
use db::Store;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_db_arg(cli.db);
    let store = Store::new(&config);

    let mut out = io::stdout().lock();
    if let Err(e) = cmd::run(cli.command, &store, &mut out) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
