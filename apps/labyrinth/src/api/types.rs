//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use labyrinth_core::{LocationId, MazeError, Notification, PlanStats};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SOLVE REQUEST/RESPONSE
// =============================================================================

/// Start a session for a maze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Maze name as typed by the user; normalized server side.
    pub maze: String,
    /// Location to start from. Defaults to the configured entry.
    #[serde(default)]
    pub entry: Option<String>,
}

/// Re-run the last session of a maze from its original entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryRequest {
    pub maze: String,
}

/// Outcome of a solve or retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Normalized maze name (or the raw input if it was rejected).
    pub maze: String,
    /// Entry the session started from.
    pub entry: Option<LocationId>,
    /// The result notification.
    pub notification: Notification,
    /// Work counters, when the solve got as far as planning.
    pub stats: Option<PlanStats>,
}

impl SolveResponse {
    /// Response for a request that failed before a session could run.
    pub fn rejected(maze: impl Into<String>, error: &MazeError) -> Self {
        Self {
            maze: maze.into(),
            entry: None,
            notification: Notification::failure(error),
            stats: None,
        }
    }
}
