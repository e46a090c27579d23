//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::config::Config;
use crate::resolver::{HttpResolver, SharedResolver};
use labyrinth_core::{
    FixtureResolver, LocationId, MazeError, MazeFixture, MazeName, MazeSession, Notification,
    PlanStats, formats::MAX_FIXTURE_SIZE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Output flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json_mode: bool,
    pub verbose: bool,
}

/// Arguments of `labyrinth solve`.
#[derive(Debug, Clone)]
pub struct SolveArgs {
    pub maze: String,
    pub entry: Option<String>,
    pub base_url: Option<String>,
    pub fixture: Option<PathBuf>,
    pub retry: bool,
}

// =============================================================================
// FIXTURE LOADING
// =============================================================================

/// Validate file path: canonicalize it and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MazeError> {
    let canonical = path.canonicalize().map_err(|e| {
        MazeError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MazeError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and parse a maze fixture file.
pub fn load_fixture(path: &Path) -> Result<MazeFixture, MazeError> {
    let canonical = validate_file_path(path)?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| MazeError::IoError(format!("Cannot read file metadata: {}", e)))?;
    let limit = u64::try_from(MAX_FIXTURE_SIZE).unwrap_or(u64::MAX);
    if metadata.len() > limit {
        return Err(MazeError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_FIXTURE_SIZE
        )));
    }

    let bytes = std::fs::read(&canonical)
        .map_err(|e| MazeError::IoError(format!("Cannot read fixture: {}", e)))?;
    let fixture = MazeFixture::from_json(&bytes)?;
    tracing::info!(
        "Loaded fixture {:?} with {} locations",
        canonical,
        fixture.locations.len()
    );
    Ok(fixture)
}

/// Build the resolver for a command and the entry it defaults to.
///
/// A fixture supplies both. Otherwise locations come from the HTTP service
/// and the entry from the configuration.
fn build_resolver(
    config: &Config,
    fixture: Option<&Path>,
) -> Result<(SharedResolver, LocationId), MazeError> {
    match fixture {
        Some(path) => {
            let fixture = load_fixture(path)?;
            let entry = LocationId::parse(fixture.entry_id().as_str())?;
            let resolver = FixtureResolver::from_fixture(fixture)?;
            Ok((Arc::new(resolver), entry))
        }
        None => {
            let entry = LocationId::parse(&config.session.entry)?;
            let resolver = HttpResolver::new(&config.resolver)?;
            tracing::info!("Resolving locations from {}", config.resolver.base_url);
            Ok((Arc::new(resolver), entry))
        }
    }
}

// =============================================================================
// SOLVE COMMAND
// =============================================================================

/// Solve a maze and print the outcome.
///
/// With `retry` the session is retried once from scratch and both runs are
/// printed. A
/// failed last run is returned as the command's error so the process exits
/// non-zero.
pub async fn cmd_solve(
    config_path: Option<&Path>,
    args: SolveArgs,
    options: OutputOptions,
) -> Result<(), MazeError> {
    let mut config = Config::load(config_path)?;
    if let Some(url) = args.base_url {
        config.resolver.base_url = url;
    }

    let (resolver, default_entry) = build_resolver(&config, args.fixture.as_deref())?;
    let entry = match args.entry.as_deref() {
        Some(raw) => LocationId::parse(raw)?,
        None => default_entry,
    };
    let entry_label = entry.clone();
    let mut session = MazeSession::open(resolver, &args.maze)?;
    let maze = session.maze().clone();
    let retry = args.retry;

    let runs = tokio::task::spawn_blocking(move || {
        let mut runs = Vec::new();
        let first = session.try_solve(&entry).map(|solution| solution.route);
        runs.push((first, session.last_stats()));
        if retry {
            if let Some(again) = session.try_retry() {
                runs.push((again.map(|solution| solution.route), session.last_stats()));
            }
        }
        runs
    })
    .await
    .map_err(|e| MazeError::IoError(format!("Solve task failed: {}", e)))?;

    let mut outcome = Ok(());
    for (run, (result, stats)) in runs.into_iter().enumerate() {
        let notification = Notification::from(result.clone());
        print_solve(
            &maze,
            &entry_label,
            run.saturating_add(1),
            &notification,
            stats,
            options,
        );
        outcome = result.map(|_| ());
    }

    outcome
}

/// Print a solve outcome as text or JSON.
fn print_solve(
    maze: &MazeName,
    entry: &LocationId,
    run: usize,
    notification: &Notification,
    stats: Option<PlanStats>,
    options: OutputOptions,
) {
    if options.json_mode {
        let output = serde_json::json!({
            "maze": maze,
            "entry": entry,
            "run": run,
            "notification": notification,
            "stats": stats,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Labyrinth Solve (run {})", run);
    println!("=====================");
    println!("Maze:  {}", maze);
    println!("Entry: {}", entry);
    println!();

    match notification {
        Notification::Success { total_steps, .. } => {
            println!("Result: success");
            println!("Steps:  {}", total_steps);
            println!("Path:   {}", notification.path_display().unwrap_or_default());
        }
        Notification::Failure { reason, message } => {
            println!("Result: failure ({:?})", reason);
            println!("Reason: {}", message);
        }
    }

    if let (true, Some(stats)) = (options.verbose, stats) {
        println!();
        println!("Planner:");
        println!("  Locations:  {}", stats.locations_resolved);
        println!("  Fetches:    {}", stats.fetches);
        println!("  Waypoints:  {}", stats.waypoints);
        println!("  Trees:      {}", stats.trees_built);
        println!("  Segments:   {}", stats.segments_computed);
        println!("  Explored:   {}", stats.branches_explored);
        println!("  Pruned:     {}", stats.branches_pruned);
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    fixture: Option<PathBuf>,
) -> Result<(), MazeError> {
    let mut config = Config::load(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let (resolver, default_entry) = build_resolver(&config, fixture.as_deref())?;

    println!("Labyrinth Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Entry:    {}", default_entry);
    match &fixture {
        Some(path) => println!("  Fixture:  {:?}", path),
        None => println!("  Service:  {}", config.resolver.base_url),
    }
    println!();
    println!("Endpoints:");
    println!("  POST /solve  - Solve a maze");
    println!("  POST /retry  - Solve the last maze again from scratch");
    println!("  GET  /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    api::run_server(&addr, AppState::new(resolver, default_entry)).await
}

// =============================================================================
// TESTS
// =============================================================================
