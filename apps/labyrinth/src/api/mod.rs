//! # Labyrinth HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /solve` - Solve a maze from an entry
//! - `POST /retry` - Solve the last maze again from scratch
//!
//! Every solve runs on tokio's blocking pool with its own empty caches.
//! The entry of each maze's last solve is kept for `/retry`, for at most
//! `MAX_TRACKED_MAZES` mazes.
//!
//! ## Configuration (Environment Variables)
//!
//! - `LABYRINTH_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `labyrinth::api::*`)
pub use handlers::{health_handler, retry_handler, solve_handler};
pub use types::{HealthResponse, RetryRequest, SolveRequest, SolveResponse};

use crate::resolver::SharedResolver;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use labyrinth_core::{LocationId, MazeError, MazeName};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KB). Requests only carry a name and an id.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Mazes remembered for `/retry`. Beyond this the oldest is forgotten.
pub const MAX_TRACKED_MAZES: usize = 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Where locations come from.
    pub resolver: SharedResolver,
    /// Entry used when a request does not name one.
    pub default_entry: LocationId,
    /// Entry of the last solve of each maze, for `/retry`.
    pub entries: Arc<RwLock<RetryEntries>>,
}

impl AppState {
    /// Create new app state around a resolver.
    #[must_use]
    pub fn new(resolver: SharedResolver, default_entry: LocationId) -> Self {
        Self::with_retry_capacity(resolver, default_entry, MAX_TRACKED_MAZES)
    }

    /// Create app state remembering at most `capacity` mazes for `/retry`.
    #[must_use]
    pub fn with_retry_capacity(
        resolver: SharedResolver,
        default_entry: LocationId,
        capacity: usize,
    ) -> Self {
        Self {
            resolver,
            default_entry,
            entries: Arc::new(RwLock::new(RetryEntries::new(capacity))),
        }
    }
}

/// Bounded map from maze to the entry of its last solve.
///
/// Remembering a new maze when full forgets the least recently solved one.
#[derive(Debug, Default)]
pub struct RetryEntries {
    capacity: usize,
    clock: u64,
    entries: BTreeMap<MazeName, (u64, LocationId)>,
}

impl RetryEntries {
    /// Create an empty map holding at most `capacity` mazes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Record the entry of a solve, evicting the oldest maze if full.
    pub fn remember(&mut self, maze: MazeName, entry: LocationId) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&maze) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (stamp, _))| *stamp)
                .map(|(name, _)| name.clone());
            if let Some(oldest) = oldest {
                tracing::debug!("Forgetting retry entry of {}", oldest);
                self.entries.remove(&oldest);
            }
        }

        self.clock = self.clock.saturating_add(1);
        self.entries.insert(maze, (self.clock, entry));
    }

    /// Entry of the last solve of `maze`.
    #[must_use]
    pub fn get(&self, maze: &MazeName) -> Option<&LocationId> {
        self.entries.get(maze).map(|(_, entry)| entry)
    }

    /// Number of mazes remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no maze is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `LABYRINTH_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: localhost only
/// - Otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("LABYRINTH_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (LABYRINTH_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins in LABYRINTH_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

/// Build a CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/solve", post(handlers::solve_handler))
        .route("/retry", post(handlers::retry_handler))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), MazeError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MazeError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Labyrinth HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| MazeError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================
