//! # Labyrinth - maze route planner
//!
//! The main binary for the Labyrinth maze solver.
//!
//! This application provides:
//! - CLI interface for solving a maze
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/labyrinth (THE BINARY)              │
//! │                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐   │
//! │  │    CLI      │   │  HTTP API   │   │ HttpResolver  │   │
//! │  │   (clap)    │   │   (axum)    │   │   (reqwest)   │   │
//! │  └──────┬──────┘   └──────┬──────┘   └───────┬───────┘   │
//! │         │                 │                  │           │
//! │         └─────────────────┼──────────────────┘           │
//! │                           ▼                              │
//! │                  ┌─────────────────┐                     │
//! │                  │ labyrinth-core  │                     │
//! │                  │   (THE LOGIC)   │                     │
//! │                  └─────────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Solve a maze against the public service
//! labyrinth solve pacman
//!
//! # Solve a maze described in a local file
//! labyrinth solve pacman --fixture maze.json --json-mode
//!
//! # Start the HTTP server
//! labyrinth server --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use labyrinth::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // LABYRINTH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LABYRINTH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "labyrinth=info,labyrinth_core=info,tower_http=debug".into());

    // Logs go to stderr so `--json-mode` output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Labyrinth startup banner.
fn print_banner() {
    println!(
        r#"
  ╦  ╔═╗╔╗ ╦ ╦╦═╗╦╔╗╔╔╦╗╦ ╦
  ║  ╠═╣╠╩╗╚╦╝╠╦╝║║║║ ║ ╠═╣
  ╩═╝╩ ╩╚═╝ ╩ ╩╚═╩╝╚╝ ╩ ╩ ╩

  Maze Route Planner v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
