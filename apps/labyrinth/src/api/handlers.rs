//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{HealthResponse, RetryRequest, SolveRequest, SolveResponse},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use labyrinth_core::{FailureReason, LocationId, MazeError, MazeName, MazeSession, Notification};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SOLVE HANDLER
// =============================================================================

/// Solve a maze with a fresh session.
pub async fn solve_handler(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> impl IntoResponse {
    let maze = match MazeName::parse(&request.maze) {
        Ok(maze) => maze,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SolveResponse::rejected(request.maze, &e)),
            );
        }
    };

    let requested = request
        .entry
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty());
    let entry = match requested.map(LocationId::parse) {
        Some(Ok(entry)) => entry,
        Some(Err(e)) => {
            tracing::warn!("Rejected entry for {}: {}", maze, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(SolveResponse::rejected(maze.as_str(), &e)),
            );
        }
        None => state.default_entry.clone(),
    };

    state
        .entries
        .write()
        .await
        .remember(maze.clone(), entry.clone());

    run_session(&state, maze, entry).await
}

// =============================================================================
// RETRY HANDLER
// =============================================================================

/// Discard everything and solve a maze again from its original entry.
pub async fn retry_handler(
    State(state): State<AppState>,
    Json(request): Json<RetryRequest>,
) -> impl IntoResponse {
    let maze = match MazeName::parse(&request.maze) {
        Ok(maze) => maze,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SolveResponse::rejected(request.maze, &e)),
            );
        }
    };

    let entry = state.entries.read().await.get(&maze).cloned();
    let Some(entry) = entry else {
        let error = MazeError::InvalidMazeName(format!("no previous session for {}", maze));
        return (
            StatusCode::NOT_FOUND,
            Json(SolveResponse::rejected(maze.as_str(), &error)),
        );
    };

    tracing::info!("Retrying maze {} from {}", maze, entry);
    run_session(&state, maze, entry).await
}

// =============================================================================
// SESSION EXECUTION
// =============================================================================

/// Run one session on the blocking pool and build the HTTP response.
async fn run_session(
    state: &AppState,
    maze: MazeName,
    entry: LocationId,
) -> (StatusCode, Json<SolveResponse>) {
    let resolver = state.resolver.clone();
    let session_maze = maze.clone();
    let session_entry = entry.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let mut session = MazeSession::new(resolver, session_maze);
        let result = session.try_solve(&session_entry);
        (result, session.last_stats())
    })
    .await;

    let (notification, stats) = match joined {
        Ok((Ok(solution), stats)) => (Notification::success(&solution.route), stats),
        Ok((Err(e), stats)) => (Notification::failure(&e), stats),
        Err(e) => {
            tracing::error!("Solve task failed: {}", e);
            let error = MazeError::IoError(format!("solve task failed: {}", e));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SolveResponse {
                    maze: maze.as_str().to_string(),
                    entry: Some(entry),
                    notification: Notification::failure(&error),
                    stats: None,
                }),
            );
        }
    };

    let status = match notification.reason() {
        None => StatusCode::OK,
        Some(FailureReason::NameNotAvailable) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    (
        status,
        Json(SolveResponse {
            maze: maze.as_str().to_string(),
            entry: Some(entry),
            notification,
            stats,
        }),
    )
}
