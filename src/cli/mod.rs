//! cli
//!
//! Command-line interface layer for racekeeper.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//! - Does NOT apply race rules directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call the [`crate::engine`] and render the outcome through
//! [`crate::ui::output`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Settings shared by every command handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// `--data-dir`, if given
    pub data_dir: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
    pub json: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = Context {
        data_dir: cli.data_dir.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Log to stderr. `RUST_LOG` wins over `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "racekeeper=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
