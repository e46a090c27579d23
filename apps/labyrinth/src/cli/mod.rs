//! # Labyrinth CLI Module
//!
//! This module implements the CLI interface for Labyrinth.
//!
//! ## Available Commands
//!
//! - `solve` - Find the shortest route through every power pill to the exit
//! - `server` - Start the HTTP server

mod commands;

use clap::{Parser, Subcommand};
use labyrinth_core::MazeError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Labyrinth - maze route planner
///
/// Discovers a maze one location at a time and finds the shortest route
/// from the entry, through every power pill, to the exit.
#[derive(Parser, Debug)]
#[command(name = "labyrinth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print planner counters after a solve
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./labyrinth.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a maze
    Solve {
        /// Maze name
        maze: String,

        /// Location to start from
        #[arg(short, long)]
        entry: Option<String>,

        /// Base URL of the maze service
        #[arg(short, long)]
        base_url: Option<String>,

        /// Read the maze from a JSON fixture instead of the service
        #[arg(short, long)]
        fixture: Option<PathBuf>,

        /// Solve a second time from scratch and report that run
        #[arg(short, long)]
        retry: bool,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve mazes from a JSON fixture instead of the service
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MazeError> {
    let options = OutputOptions {
        json_mode: cli.json_mode,
        verbose: cli.verbose,
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Solve {
            maze,
            entry,
            base_url,
            fixture,
            retry,
        }) => {
            let request = SolveArgs {
                maze,
                entry,
                base_url,
                fixture,
                retry,
            };
            cmd_solve(config_path, request, options).await
        }
        Some(Commands::Server {
            host,
            port,
            fixture,
        }) => cmd_server(config_path, host, port, fixture).await,
        None => {
            use clap::CommandFactory;
            Cli::command()
                .print_help()
                .map_err(|e| MazeError::IoError(format!("Cannot print help: {}", e)))
        }
    }
}
