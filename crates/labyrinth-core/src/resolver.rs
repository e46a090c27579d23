//! # Location Resolver
//!
//! The single seam between the CORE and the service that knows the maze.
//!
//! A resolver answers one question: "what is at location X of maze M?".
//! The CORE calls it synchronously, one location at a time, and never
//! retries. Transport, timeouts and decoding all live behind the trait.

use crate::primitives::MAX_LOCATION_ID_LENGTH;
use crate::types::is_path_segment;
use crate::{Location, LocationId, LocationRole, MazeError, MazeName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// WIRE RECORD
// =============================================================================

/// A location as the remote service describes it.
///
/// Mirrors the service's JSON body:
/// `{"LocationId": "...", "LocationType": "PowerPill", "Exits": [".../<id>"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Canonical identifier of the location.
    #[serde(rename = "LocationId")]
    pub id: String,
    /// Role of the location.
    #[serde(rename = "LocationType")]
    pub role: LocationRole,
    /// References to neighboring locations.
    #[serde(rename = "Exits", default)]
    pub exits: Vec<String>,
}

impl LocationRecord {
    /// Create a record.
    #[must_use]
    pub fn new(id: impl Into<String>, role: LocationRole, exits: Vec<String>) -> Self {
        Self {
            id: id.into(),
            role,
            exits,
        }
    }

    /// Convert the record into a `Location`, extracting neighbor ids.
    ///
    /// `requested` is only used to label the error when the record carries no id.
    pub fn into_location(self, requested: &LocationId) -> Result<Location, MazeError> {
        if self.id.trim().is_empty() {
            return Err(MazeError::LocationUnavailable {
                id: requested.clone(),
                reason: "record has no LocationId".to_string(),
            });
        }

        let neighbors = self
            .exits
            .iter()
            .map(|reference| location_id_from_reference(reference))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Location::new(
            LocationId::new(self.id.trim()),
            self.role,
            neighbors,
        ))
    }
}

/// Extract a location id from a neighbor reference.
///
/// The id is the final non-empty path segment, so both bare ids and URLs
/// such as `http://host/Maze/Location/pacman/<id>` are accepted.
pub fn location_id_from_reference(reference: &str) -> Result<LocationId, MazeError> {
    let segment = reference
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if !is_path_segment(segment, MAX_LOCATION_ID_LENGTH) {
        return Err(MazeError::MalformedReference(reference.to_string()));
    }

    Ok(LocationId::new(segment))
}

// =============================================================================
// RESOLVER TRAIT
// =============================================================================

/// Source of location data for a maze.
///
/// Implementations must be deterministic for the lifetime of a session:
/// the same `(maze, id)` pair must describe the same location.
pub trait LocationResolver {
    /// Fetch the location `id` of `maze`.
    ///
    /// Returns `MazeError::LocationUnavailable` when the location is unknown
    /// or the service cannot be reached.
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError>;
}

impl<R: LocationResolver + ?Sized> LocationResolver for &R {
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError> {
        (**self).fetch(maze, id)
    }
}

impl<R: LocationResolver + ?Sized> LocationResolver for Box<R> {
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError> {
        (**self).fetch(maze, id)
    }
}

impl<R: LocationResolver + ?Sized> LocationResolver for Arc<R> {
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError> {
        (**self).fetch(maze, id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
