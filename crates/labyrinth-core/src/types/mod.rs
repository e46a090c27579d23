//! # Core Type Definitions
//!
//! This module contains all core types for the Labyrinth routing engine:
//! - Identifiers (`LocationId`, `MazeName`)
//! - Maze structure (`LocationRole`, `Location`)
//! - Output structures (`Route`)
//! - Error types (`MazeError`)
//!
//! ## Determinism Guarantees
//!
//! Identifiers implement `Ord` so that every container in the CORE can be a
//! `BTreeMap`/`BTreeSet`. The ordering is lexical and carries no meaning for
//! the maze itself; it only makes iteration order reproducible.

use crate::primitives::{
    MAX_LOCATION_ID_LENGTH, MAX_MAZE_NAME_LENGTH, WIRE_EXIT, WIRE_NORMAL, WIRE_POWER_PILL,
    WIRE_START,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Whether `s` can be used verbatim as one path segment of a resolver URL.
///
/// Rejects empty and over-long values, dot segments, whitespace and control
/// characters, and anything a URL parser treats as a separator or escape.
pub(crate) fn is_path_segment(s: &str, max_len: usize) -> bool {
    !s.is_empty()
        && s.len() <= max_len
        && s != "."
        && s != ".."
        && !s.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '/' | '\\' | '?' | '#' | '%')
        })
}

/// Opaque identifier of a location inside a maze.
///
/// The remote service hands out UUID-like strings; the CORE never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    /// Create a new identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate a user supplied identifier, such as an entry location.
    ///
    /// The id must be a single URL path segment of at most
    /// `MAX_LOCATION_ID_LENGTH` bytes; anything else is
    /// `MazeError::LocationUnavailable`.
    pub fn parse(raw: &str) -> Result<Self, MazeError> {
        let id = raw.trim();
        if !is_path_segment(id, MAX_LOCATION_ID_LENGTH) {
            return Err(MazeError::LocationUnavailable {
                id: Self::new(id),
                reason: "not a valid location id".to_string(),
            });
        }
        Ok(Self::new(id))
    }

    /// Whether this id is safe to send to a resolver.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_path_segment(&self.0, MAX_LOCATION_ID_LENGTH)
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LocationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Normalized name of a maze, as used in resolver URLs.
///
/// Names are trimmed and lower-cased. Anything that is not a single URL path
/// segment of at most `MAX_MAZE_NAME_LENGTH` bytes is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MazeName(String);

impl MazeName {
    /// Normalize and validate a user supplied maze name.
    pub fn parse(raw: &str) -> Result<Self, MazeError> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(MazeError::InvalidMazeName(raw.to_string()));
        }
        if name.len() > MAX_MAZE_NAME_LENGTH {
            return Err(MazeError::InvalidMazeName(format!(
                "name length {} exceeds maximum {} bytes",
                name.len(),
                MAX_MAZE_NAME_LENGTH
            )));
        }
        if !is_path_segment(&name, MAX_MAZE_NAME_LENGTH) {
            return Err(MazeError::InvalidMazeName(raw.to_string()));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MazeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LOCATION
// =============================================================================

/// The role a location plays in the maze.
///
/// On the wire this is the `LocationType` field. `Start` is folded into
/// `Normal`: the entrance has no special meaning once the session has begun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationRole {
    /// A plain corridor cell.
    #[serde(alias = "Start")]
    Normal,
    /// A power pill that every route must collect.
    #[serde(rename = "PowerPill", alias = "Waypoint")]
    Waypoint,
    /// The single exit of the maze.
    Exit,
}

impl LocationRole {
    /// Parse a `LocationType` wire value.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            WIRE_NORMAL | WIRE_START => Some(Self::Normal),
            WIRE_POWER_PILL => Some(Self::Waypoint),
            WIRE_EXIT => Some(Self::Exit),
            _ => None,
        }
    }

    /// The canonical `LocationType` wire value.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Normal => WIRE_NORMAL,
            Self::Waypoint => WIRE_POWER_PILL,
            Self::Exit => WIRE_EXIT,
        }
    }
}

/// A resolved maze location.
///
/// Created once by the lazy graph and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier of this location.
    pub id: LocationId,
    /// What this location is.
    pub role: LocationRole,
    /// Directly reachable locations, in the order the resolver listed them.
    pub neighbors: Vec<LocationId>,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(id: LocationId, role: LocationRole, neighbors: Vec<LocationId>) -> Self {
        Self {
            id,
            role,
            neighbors,
        }
    }
}

// =============================================================================
// ROUTE
// =============================================================================

/// A complete solution: entry, every waypoint in the chosen order, then exit.
///
/// Junction nodes shared by two consecutive segments appear once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Route {
    /// Locations from entry to exit inclusive.
    pub path: Vec<LocationId>,
}

impl Route {
    /// Create a route from a path.
    #[must_use]
    pub fn new(path: Vec<LocationId>) -> Self {
        Self { path }
    }

    /// Number of moves, i.e. edges, the route takes.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// The first location of the route.
    #[must_use]
    pub fn entry(&self) -> Option<&LocationId> {
        self.path.first()
    }

    /// The last location of the route.
    #[must_use]
    pub fn exit(&self) -> Option<&LocationId> {
        self.path.last()
    }

    /// Check if the route is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while discovering and routing a maze.
///
/// - `Unreachable` is the only recoverable kind; the planner swallows it
/// - Everything else aborts the solve and becomes a failure notification
/// - The CORE never panics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// The resolver could not produce usable data for a location.
    #[error("Location unavailable: {id} ({reason})")]
    LocationUnavailable {
        /// The location that was requested.
        id: LocationId,
        /// What went wrong.
        reason: String,
    },

    /// A neighbor reference could not be turned into a location id.
    #[error("Malformed location reference: {0:?}")]
    MalformedReference(String),

    /// Two different exits were discovered in one session.
    #[error("Ambiguous exit: {recorded} already recorded, found {found}")]
    AmbiguousExit {
        /// The exit seen first.
        recorded: LocationId,
        /// The conflicting exit.
        found: LocationId,
    },

    /// No path exists between two locations.
    #[error("No path from {from} to {to}")]
    Unreachable {
        /// Segment source.
        from: LocationId,
        /// Segment target.
        to: LocationId,
    },

    /// No ordering of the waypoints reaches the exit.
    #[error("No solution: the exit cannot be reached through every waypoint")]
    NoSolution,

    /// The maze name is empty or unusable.
    #[error("Maze name not available: {0:?}")]
    InvalidMazeName(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MazeError {
    /// Check if this error only invalidates one search branch.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
