//! Time Village CLI - track time, spend it on buildings.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use timevillage_core::MoveDirection;

/// Time Village - an idle village builder paid for with tracked time
#[derive(Parser, Debug)]
#[command(name = "timevillage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show balances, grid and buildings
    Status,

    /// Print the active rules table
    Rules,

    /// Run the timer for a category, then commit the time
    Track {
        /// Category name (created if missing)
        category: String,

        /// Stop after this many seconds (default: wait for Ctrl-C)
        #[arg(short, long)]
        seconds: Option<u64>,
    },

    /// Buy a new level-1 building
    Buy {
        /// Building type, e.g. HOUSE
        kind: String,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },

    /// Upgrade a building by one level
    Upgrade {
        /// Building id as shown by `status`
        id: u64,
    },

    /// Manage timer categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Change the player nickname
    Nickname { name: String },

    /// Download every building asset into the cache
    Preload,

    /// Cloud synchronisation
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
    /// List categories in display order
    List,
    /// Add a category at the end of the list
    Add {
        name: String,
        /// Colour as #RRGGBB or #AARRGGBB
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a category
    Rename { id: u64, name: String },
    /// Change a category's colour
    Color { id: u64, color: String },
    /// Move a category one place up or down
    Move { id: u64, direction: Direction },
    /// Delete a category
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
enum SyncAction {
    /// Overwrite the cloud copy with the local village
    Push,
    /// Replace the local village with the cloud copy
    Pull,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}: {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    match commands::run(args.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
