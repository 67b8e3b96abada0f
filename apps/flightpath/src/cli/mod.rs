//! # Flightpath CLI Module
//!
//! ## Available Commands
//!
//! - `submit` - Submit a quick or deep assessment from a file
//! - `tech-stack` - Replace the tech stack from a file
//! - `status` - Show score, plane level, miles and REAO
//! - `route` - Show one route's unlock state
//! - `cities` - Show every city's unlock state
//! - `history` - Show the flight log
//! - `clear-history` - Delete the flight log
//! - `trend` - First-vs-last change across the flight log
//! - `project` - What-if projection; never touches stored state
//! - `profile` - Show or replace the user profile
//! - `scenario` - Show or set Operations Center scenario statuses
//! - `init` - Write a default configuration file

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use flightpath_core::{FlightpathError, ScenarioStatus};
use std::path::{Path, PathBuf};

pub use commands::*;

use crate::config::DEFAULT_CONFIG_PATH;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Flightpath - marketing maturity progression
///
/// Turns assessment answers and a tech stack into a plane level, flight
/// miles and unlocked routes.
#[derive(Parser, Debug)]
#[command(name = "flightpath")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the data store (overrides the configured `data_path`)
    #[arg(short = 'D', long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to the TOML configuration file
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Scenario status as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    NotStarted,
    InProgress,
    Completed,
}

impl From<ScenarioArg> for ScenarioStatus {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::NotStarted => ScenarioStatus::NotStarted,
            ScenarioArg::InProgress => ScenarioStatus::InProgress,
            ScenarioArg::Completed => ScenarioStatus::Completed,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit an assessment
    Submit {
        /// Assessment kind (quick, deep)
        #[arg(short, long, default_value = "quick")]
        kind: String,

        /// JSON array of responses
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Replace the tech stack
    TechStack {
        /// JSON array of tech-stack entries
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the current progression state
    Status {
        /// Include every route and city
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show one route's status
    Route {
        /// Route id (e.g. brand-content)
        id: String,
    },

    /// Show every city's unlock state
    Cities,

    /// Show the assessment history
    History,

    /// Delete the assessment history
    ClearHistory,

    /// Show first-vs-last change across the history
    Trend,

    /// Project hypothetical inputs without changing stored state
    Project {
        /// JSON array of hypothetical responses
        #[arg(short, long)]
        responses: Option<PathBuf>,

        /// JSON array of hypothetical tech-stack entries
        #[arg(short, long)]
        tech_stack: Option<PathBuf>,

        /// Project a combined score directly instead
        #[arg(short, long, conflicts_with_all = ["responses", "tech_stack"])]
        score: Option<u8>,
    },

    /// Show the user profile, or replace it from a file
    Profile {
        /// JSON user profile
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show scenario statuses, or set one
    Scenario {
        /// Scenario id
        id: Option<String>,

        /// New status for the scenario
        #[arg(short, long, value_enum, requires = "id")]
        status: Option<ScenarioArg>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), FlightpathError> {
    let Cli {
        command,
        config,
        data,
        json_mode,
        ..
    } = cli;
    let data = data.as_deref();

    match command {
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::Submit { kind, file }) => with_shell(&config, data, |shell| {
            cmd_submit(shell, json_mode, &kind, &file)
        }),
        Some(Commands::TechStack { file }) => {
            with_shell(&config, data, |shell| cmd_tech_stack(shell, json_mode, &file))
        }
        Some(Commands::Status { detailed }) => {
            with_shell(&config, data, |shell| cmd_status(shell, json_mode, detailed))
        }
        Some(Commands::Route { id }) => {
            with_shell(&config, data, |shell| cmd_route(shell, json_mode, &id))
        }
        Some(Commands::Cities) => with_shell(&config, data, |shell| cmd_cities(shell, json_mode)),
        Some(Commands::History) => {
            with_shell(&config, data, |shell| cmd_history(shell, json_mode))
        }
        Some(Commands::ClearHistory) => {
            with_shell(&config, data, |shell| cmd_clear_history(shell, json_mode))
        }
        Some(Commands::Trend) => with_shell(&config, data, |shell| cmd_trend(shell, json_mode)),
        Some(Commands::Project {
            responses,
            tech_stack,
            score,
        }) => with_shell(&config, data, |shell| {
            cmd_project(
                shell,
                json_mode,
                responses.as_deref(),
                tech_stack.as_deref(),
                score,
            )
        }),
        Some(Commands::Profile { file }) => with_shell(&config, data, |shell| {
            cmd_profile(shell, json_mode, file.as_deref())
        }),
        Some(Commands::Scenario { id, status }) => with_shell(&config, data, |shell| {
            cmd_scenario(shell, json_mode, id.as_deref(), status.map(Into::into))
        }),
        // No subcommand - show status by default
        None => with_shell(&config, data, |shell| cmd_status(shell, json_mode, false)),
    }
}

/// Open the engine, run one command against it, then flush pending writes.
fn with_shell(
    config: &Path,
    data: Option<&Path>,
    run: impl FnOnce(&mut Shell) -> Result<(), FlightpathError>,
) -> Result<(), FlightpathError> {
    let mut shell = Shell::open(config, data)?;
    let result = run(&mut shell);
    shell.engine.flush();
    result
}
