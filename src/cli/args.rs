//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--data-dir <path>`: Use this data directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::lifecycle::Placement;
use crate::core::ranking::ValidationMode;
use crate::core::types::{RaceId, StudentId};

/// racekeeper - Lane assignment and results for school races
#[derive(Parser, Debug)]
#[command(name = "rk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding races.json (default: ~/.racekeeper/data)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the student directory
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Create races, assign lanes and record results
    #[command(
        long_about = "Create races, assign lanes and record results.\n\n\
            A race starts OPEN. Students are registered one at a time and each \
            receives the next lane number. Locking closes registration and needs \
            at least the configured minimum of participants. Recording results \
            finalizes the race.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Set up a race
    rk race create \"100m sprint\"
    rk race register 1 4
    rk race register 1 7

    # Close registration
    rk race lock 1

    # Record places by lane id (see 'rk race show 1')
    rk race results 1 2=1 1=2

    # Check only the final standings, in any order
    rk race results 1 1=2 2=1 --mode strict

    # Ties share a place, the next place is skipped
    rk race results 2 3=1 4=1 5=3"
    )]
    Race {
        #[command(subcommand)]
        action: RaceAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        after_help = "\
INSTALLATION:
    # Bash (add to ~/.bashrc)
    rk completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    rk completion zsh >> ~/.zshrc

    # Fish
    rk completion fish > ~/.config/fish/completions/rk.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Student subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StudentAction {
    /// Add a student to the directory
    Add {
        /// Display name
        name: String,
    },
    /// List all students
    List,
}

/// Race subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RaceAction {
    /// Create a new race
    Create {
        /// Race name
        name: String,
    },
    /// List all races
    List,
    /// Show a race with its lanes
    Show {
        /// Race id
        race: RaceId,
    },
    /// Delete a race and its lanes
    Delete {
        /// Race id
        race: RaceId,
    },
    /// Assign a student to the next lane
    Register {
        /// Race id
        race: RaceId,
        /// Student id
        student: StudentId,
    },
    /// List students not yet in the race
    Available {
        /// Race id
        race: RaceId,
    },
    /// Close registration
    Lock {
        /// Race id
        race: RaceId,
    },
    /// Check a race's lanes and recorded places
    Verify {
        /// Race id
        race: RaceId,
    },
    /// Record finishing places and finalize the race
    Results {
        /// Race id
        race: RaceId,

        /// Places as LANE_ID=PLACE
        #[arg(required = true, value_name = "LANE=PLACE")]
        placements: Vec<Placement>,

        /// Validation mode (strict or incremental)
        #[arg(long, value_name = "MODE")]
        mode: Option<ValidationMode>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a value in the data-directory config
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List effective configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
