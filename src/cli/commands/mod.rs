//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the store for the resolved data directory
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT apply race rules directly.

mod completion;
mod config_cmd;
mod race;
mod student;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::cli::args::{Command, ConfigAction, RaceAction, StudentAction};
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::paths::DataPaths;
use crate::engine::Engine;
use crate::store::FileStore;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Student { action } => match action {
            StudentAction::Add { name } => student::add(ctx, &name),
            StudentAction::List => student::list(ctx),
        },
        Command::Race { action } => match action {
            RaceAction::Create { name } => race::create(ctx, &name),
            RaceAction::List => race::list(ctx),
            RaceAction::Show { race } => race::show(ctx, race),
            RaceAction::Delete { race } => race::delete(ctx, race),
            RaceAction::Register { race, student } => race::register(ctx, race, student),
            RaceAction::Available { race } => race::available(ctx, race),
            RaceAction::Lock { race } => race::lock(ctx, race),
            RaceAction::Verify { race } => race::verify(ctx, race),
            RaceAction::Results {
                race,
                placements,
                mode,
            } => race::results(ctx, race, &placements, mode),
        },
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_get(ctx, &key),
            ConfigAction::Set { key, value } => config_set(ctx, &key, &value),
            ConfigAction::List => config_list(ctx),
        },
        Command::Completion { shell } => completion(shell),
    }
}

/// Loaded configuration and the data directory it resolved to.
pub(crate) struct Session {
    pub config: Config,
    pub paths: DataPaths,
}

/// Load configuration and resolve the data directory.
pub(crate) fn session(ctx: &Context) -> Result<Session> {
    let mut config = Config::load(None).context("Failed to load configuration")?;

    let paths = DataPaths::resolve(ctx.data_dir.as_deref(), config.data_dir())
        .context("Cannot determine a data directory; pass --data-dir")?;

    config
        .load_data(&paths)
        .context("Failed to load data-directory configuration")?;

    debug!(data_dir = %paths.data_dir.display(), "resolved data directory");
    Ok(Session { config, paths })
}

/// Open the store and build an engine from the effective configuration.
pub(crate) fn open_engine(ctx: &Context) -> Result<Engine<FileStore>> {
    let session = session(ctx)?;
    let store = FileStore::open(&session.paths).with_context(|| {
        format!(
            "Failed to open data directory {}",
            session.paths.data_dir.display()
        )
    })?;
    Ok(Engine::new(store, session.config.lifecycle()))
}
