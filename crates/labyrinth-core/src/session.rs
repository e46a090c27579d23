//! # Session Module
//!
//! Session control and result notification.
//!
//! A `MazeSession` binds a resolver to one maze and remembers the entry it
//! was last solved from. All discovery state (the lazy graph, the tree and
//! segment memos, waypoints, exit) lives in a `RoutePlanner` that exists
//! only for the duration of one solve:
//! - `solve` builds a fresh planner and drops it when done
//! - `retry` is a fresh `solve` from the remembered entry, never a resumption
//!
//! Every outcome is reported as a `Notification`, the shape the UI layer
//! consumes.

use crate::planner::{PlanStats, RoutePlanner};
use crate::primitives::DEFAULT_ENTRY;
use crate::resolver::LocationResolver;
use crate::{LocationId, MazeError, MazeName, Route};
use serde::{Deserialize, Serialize};

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Why a solve failed, as reported to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The maze name was empty or unusable.
    NameNotAvailable,
    /// The maze itself is malformed (bad references, several exits).
    Lost,
    /// No route through every waypoint reaches the exit.
    NoSolution,
    /// A location could not be fetched.
    LocationUnavailable,
}

impl From<&MazeError> for FailureReason {
    fn from(error: &MazeError) -> Self {
        match error {
            MazeError::InvalidMazeName(_) => Self::NameNotAvailable,
            MazeError::MalformedReference(_) | MazeError::AmbiguousExit { .. } => Self::Lost,
            MazeError::NoSolution | MazeError::Unreachable { .. } => Self::NoSolution,
            MazeError::LocationUnavailable { .. }
            | MazeError::IoError(_)
            | MazeError::SerializationError(_) => Self::LocationUnavailable,
        }
    }
}

/// Outcome of a solve, as emitted to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "outcome",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    /// A route was found.
    Success {
        /// Moves from entry to exit.
        total_steps: usize,
        /// Locations from entry to exit inclusive.
        path: Vec<LocationId>,
    },
    /// The solve failed; no partial route is reported.
    Failure {
        /// Category of the failure.
        reason: FailureReason,
        /// Human readable detail.
        message: String,
    },
}

impl Notification {
    /// Success notification for a route.
    #[must_use]
    pub fn success(route: &Route) -> Self {
        Self::Success {
            total_steps: route.steps(),
            path: route.path.clone(),
        }
    }

    /// Failure notification for an error.
    #[must_use]
    pub fn failure(error: &MazeError) -> Self {
        Self::Failure {
            reason: FailureReason::from(error),
            message: error.to_string(),
        }
    }

    /// Check if this is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Moves of a successful route.
    #[must_use]
    pub fn total_steps(&self) -> Option<usize> {
        match self {
            Self::Success { total_steps, .. } => Some(*total_steps),
            Self::Failure { .. } => None,
        }
    }

    /// Failure category, if this is a failure.
    #[must_use]
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }

    /// The path joined with commas, the form the result page displays.
    #[must_use]
    pub fn path_display(&self) -> Option<String> {
        match self {
            Self::Success { path, .. } => Some(
                path.iter()
                    .map(LocationId::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::Failure { .. } => None,
        }
    }
}

impl From<Result<Route, MazeError>> for Notification {
    fn from(result: Result<Route, MazeError>) -> Self {
        match result {
            Ok(route) => Self::success(&route),
            Err(e) => Self::failure(&e),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A solved route together with the work it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The route.
    pub route: Route,
    /// Counters from the planner that produced it.
    pub stats: PlanStats,
}

/// Session control surface for one maze.
#[derive(Debug)]
pub struct MazeSession<R> {
    resolver: R,
    maze: MazeName,
    entry: Option<LocationId>,
    runs: usize,
    last_stats: Option<PlanStats>,
}

impl<R: LocationResolver> MazeSession<R> {
    /// Create a session for an already validated maze name.
    #[must_use]
    pub fn new(resolver: R, maze: MazeName) -> Self {
        Self {
            resolver,
            maze,
            entry: None,
            runs: 0,
            last_stats: None,
        }
    }

    /// Create a session from a raw, user supplied maze name.
    pub fn open(resolver: R, raw_name: &str) -> Result<Self, MazeError> {
        Ok(Self::new(resolver, MazeName::parse(raw_name)?))
    }

    /// Solve from `entry` with empty caches.
    pub fn try_solve(&mut self, entry: &LocationId) -> Result<Solution, MazeError> {
        self.entry = Some(entry.clone());
        self.runs = self.runs.saturating_add(1);

        tracing::info!(maze = %self.maze, entry = %entry, run = self.runs, "solving maze");

        let mut planner = RoutePlanner::new(&self.resolver, self.maze.clone());
        let result = planner.plan(entry);
        let stats = planner.stats();
        self.last_stats = Some(stats);

        match result {
            Ok(route) => Ok(Solution { route, stats }),
            Err(e) => {
                tracing::warn!(maze = %self.maze, error = %e, "solve failed");
                Err(e)
            }
        }
    }

    /// Solve from `entry` and report the outcome as a notification.
    pub fn solve(&mut self, entry: &LocationId) -> Notification {
        self.try_solve(entry).map(|s| s.route).into()
    }

    /// Solve from the maze's default entry.
    pub fn solve_default(&mut self) -> Notification {
        self.solve(&LocationId::new(DEFAULT_ENTRY))
    }

    /// Discard everything and solve again from the last entry.
    ///
    /// Returns `None` if the session has never been solved.
    pub fn retry(&mut self) -> Option<Notification> {
        self.try_retry()
            .map(|result| Notification::from(result.map(|s| s.route)))
    }

    /// Like [`retry`](Self::retry), keeping the stats of the run.
    pub fn try_retry(&mut self) -> Option<Result<Solution, MazeError>> {
        let entry = self.entry.clone()?;
        tracing::info!(maze = %self.maze, entry = %entry, "retrying from scratch");
        Some(self.try_solve(&entry))
    }
}

impl<R> MazeSession<R> {
    /// The maze this session solves.
    #[must_use]
    pub fn maze(&self) -> &MazeName {
        &self.maze
    }

    /// The entry of the last solve.
    #[must_use]
    pub fn entry(&self) -> Option<&LocationId> {
        self.entry.as_ref()
    }

    /// Number of solves run, retries included.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Counters of the last solve.
    #[must_use]
    pub fn last_stats(&self) -> Option<PlanStats> {
        self.last_stats
    }
}

/// Validate `raw_name`, then solve it from `entry` in a one-shot session.
///
/// An unusable name is reported as `NameNotAvailable` without touching the
/// resolver.
pub fn solve_maze<R: LocationResolver>(
    resolver: R,
    raw_name: &str,
    entry: &LocationId,
) -> Notification {
    match MazeSession::open(resolver, raw_name) {
        Ok(mut session) => session.solve(entry),
        Err(e) => Notification::failure(&e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
