//! # gasnet CLI Module
//!
//! This module implements the CLI interface for gasnet.
//!
//! ## Available Commands
//!
//! - `status` - Show record counts and next ids (default)
//! - `list` - Show every pipe and station
//! - `pipe` - Add, show, list, delete, repair, find and batch-edit pipes
//! - `station` - Add, show, list, delete, start/stop workshops, find and
//!   batch-edit stations
//! - `save` - Write a copy of the data to another file
//! - `load` - Replace the data with the contents of a snapshot file
//! - `init` - Create an empty data file

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use gasnet_core::primitives::{
    MAX_UNUSED_PERCENT, MIN_PIPE_DIAMETER_MM, MIN_PIPE_LENGTH_KM, MIN_TOTAL_WORKSHOPS,
};
use gasnet_core::{GasnetError, StationEdit};
use std::path::PathBuf;

use crate::config::Config;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// gasnet - pipe and compressor-station registry
///
/// Keeps pipes and compressor stations of a gas transmission network in a
/// plain-text data file.
#[derive(Parser, Debug)]
#[command(name = "gasnet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the data file [default: gasnet.txt]
    #[arg(short = 'D', long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to a TOML configuration file [default: gasnet.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the append-only audit log [default: gasnet.log]
    #[arg(long, global = true)]
    pub audit_log: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show record counts and next ids
    Status,

    /// Show every pipe and station
    List,

    /// Manage pipes
    Pipe {
        #[command(subcommand)]
        command: PipeCommand,
    },

    /// Manage compressor stations
    Station {
        #[command(subcommand)]
        command: StationCommand,
    },

    /// Write a copy of the current data to a file
    Save {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace the current data with a snapshot file
    Load {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Create an empty data file
    Init {
        /// Overwrite an existing data file
        #[arg(short, long)]
        force: bool,
    },
}

/// Pipe subcommands.
#[derive(Subcommand, Debug)]
pub enum PipeCommand {
    /// Add a pipe
    Add {
        /// Pipe name
        #[arg(short, long)]
        name: String,

        /// Length in kilometres
        #[arg(short, long, value_parser = parse_length)]
        length: f64,

        /// Diameter in millimetres
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(i64::from(MIN_PIPE_DIAMETER_MM)..))]
        diameter: u32,

        /// Mark the pipe as under repair
        #[arg(short, long)]
        repair: bool,
    },

    /// Show one pipe
    Show { id: u64 },

    /// Show every pipe
    List,

    /// Delete a pipe
    Delete { id: u64 },

    /// Toggle a pipe's repair flag
    Repair { id: u64 },

    /// Find pipes by name and/or repair state
    Find {
        /// Name substring (case-sensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Repair state (true/false)
        #[arg(short, long)]
        repair: Option<bool>,
    },

    /// Change the repair flag of every matching pipe
    Batch {
        /// Name substring (case-sensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Repair state (true/false)
        #[arg(short, long)]
        repair: Option<bool>,

        /// Restrict the edit to these ids among the matches (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,

        /// Set the flag to this value instead of toggling it
        #[arg(long)]
        set: Option<bool>,
    },
}

/// Station subcommands.
#[derive(Subcommand, Debug)]
pub enum StationCommand {
    /// Add a compressor station
    Add {
        /// Station name
        #[arg(short, long)]
        name: String,

        /// Total number of workshops
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(i64::from(MIN_TOTAL_WORKSHOPS)..))]
        total: u32,

        /// Number of working workshops
        #[arg(short, long, default_value = "0")]
        working: u32,

        /// Classification label
        #[arg(long, default_value = "")]
        class: String,
    },

    /// Show one station
    Show { id: u64 },

    /// Show every station
    List,

    /// Delete a station
    Delete { id: u64 },

    /// Bring one more workshop into service
    Start { id: u64 },

    /// Take one workshop out of service
    Stop { id: u64 },

    /// Find stations by name and/or unused capacity
    Find {
        /// Name substring (case-sensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Minimum percentage of idle workshops (0-100)
        #[arg(short, long, value_parser = parse_percent)]
        min_unused: Option<f64>,
    },

    /// Start or stop one workshop on every matching station
    Batch {
        /// Transition to apply
        #[arg(value_enum)]
        action: BatchAction,

        /// Name substring (case-sensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Minimum percentage of idle workshops (0-100)
        #[arg(short, long, value_parser = parse_percent)]
        min_unused: Option<f64>,

        /// Restrict the edit to these ids among the matches (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,
    },
}

/// Workshop transition for `station batch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchAction {
    Start,
    Stop,
}

impl From<BatchAction> for StationEdit {
    fn from(action: BatchAction) -> Self {
        match action {
            BatchAction::Start => Self::StartWorkshop,
            BatchAction::Stop => Self::StopWorkshop,
        }
    }
}

// =============================================================================
// ARGUMENT PARSERS
// =============================================================================

/// Parse a pipe length in kilometres.
fn parse_length(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !value.is_finite() || value < MIN_PIPE_LENGTH_KM {
        return Err(format!("length must be at least {} km", MIN_PIPE_LENGTH_KM));
    }
    Ok(value)
}

/// Parse a percentage in `0..=100`.
fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !(0.0..=MAX_UNUSED_PERCENT).contains(&value) {
        return Err(format!("percentage must be within 0-{}", MAX_UNUSED_PERCENT));
    }
    Ok(value)
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolved settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Snapshot file holding the data.
    pub data_file: PathBuf,
    /// Print JSON instead of text.
    pub json: bool,
}

impl Context {
    /// Merge CLI flags over configuration values.
    #[must_use]
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            data_file: cli.data.clone().unwrap_or_else(|| config.data_file.clone()),
            json: cli.json || config.json,
        }
    }
}

/// Execute the CLI with parsed arguments.
pub fn execute(command: Option<Commands>, ctx: &Context) -> Result<(), GasnetError> {
    match command {
        Some(Commands::Status) | None => cmd_status(ctx),
        Some(Commands::List) => cmd_list(ctx),
        Some(Commands::Pipe { command }) => execute_pipe(command, ctx),
        Some(Commands::Station { command }) => execute_station(command, ctx),
        Some(Commands::Save { output }) => cmd_save(ctx, &output),
        Some(Commands::Load { input }) => cmd_load(ctx, &input),
        Some(Commands::Init { force }) => cmd_init(ctx, force),
    }
}

fn execute_pipe(command: PipeCommand, ctx: &Context) -> Result<(), GasnetError> {
    match command {
        PipeCommand::Add {
            name,
            length,
            diameter,
            repair,
        } => cmd_pipe_add(ctx, &name, length, diameter, repair),
        PipeCommand::Show { id } => cmd_pipe_show(ctx, id),
        PipeCommand::List => cmd_pipe_list(ctx),
        PipeCommand::Delete { id } => cmd_pipe_delete(ctx, id),
        PipeCommand::Repair { id } => cmd_pipe_repair(ctx, id),
        PipeCommand::Find { name, repair } => cmd_pipe_find(ctx, name, repair),
        PipeCommand::Batch {
            name,
            repair,
            ids,
            set,
        } => cmd_pipe_batch(ctx, name, repair, &ids, set),
    }
}

fn execute_station(command: StationCommand, ctx: &Context) -> Result<(), GasnetError> {
    match command {
        StationCommand::Add {
            name,
            total,
            working,
            class,
        } => cmd_station_add(ctx, &name, total, working, &class),
        StationCommand::Show { id } => cmd_station_show(ctx, id),
        StationCommand::List => cmd_station_list(ctx),
        StationCommand::Delete { id } => cmd_station_delete(ctx, id),
        StationCommand::Start { id } => cmd_station_workshop(ctx, id, StationEdit::StartWorkshop),
        StationCommand::Stop { id } => cmd_station_workshop(ctx, id, StationEdit::StopWorkshop),
        StationCommand::Find { name, min_unused } => cmd_station_find(ctx, name, min_unused),
        StationCommand::Batch {
            action,
            name,
            min_unused,
            ids,
        } => cmd_station_batch(ctx, action.into(), name, min_unused, &ids),
    }
}
