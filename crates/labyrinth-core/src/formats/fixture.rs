//! # Maze Fixture Format
//!
//! A whole maze written down as JSON, served by an in-memory resolver.
//!
//! Fixtures let a maze be solved without the remote service: the CLI's
//! `--fixture` flag, the HTTP API tests and the benches all use them.
//!
//! ```json
//! {
//!   "name": "pacman",
//!   "entry": "start",
//!   "aliases": { "start": "a" },
//!   "locations": [
//!     { "LocationId": "a", "LocationType": "Normal", "Exits": ["b"] },
//!     { "LocationId": "b", "LocationType": "Exit",   "Exits": ["a"] }
//!   ]
//! }
//! ```
//!
//! Location records use the same shape as the remote service.
//!
//! ## Security
//!
//! Payloads are size-checked before parsing (`MAX_FIXTURE_SIZE`).

use crate::primitives::DEFAULT_ENTRY;
use crate::resolver::{LocationRecord, LocationResolver};
use crate::{LocationId, MazeError, MazeName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maximum accepted fixture payload (16 MB).
pub const MAX_FIXTURE_SIZE: usize = 16 * 1024 * 1024;

fn default_entry() -> String {
    DEFAULT_ENTRY.to_string()
}

// =============================================================================
// FIXTURE FILE
// =============================================================================

/// A maze described in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeFixture {
    /// Maze name this fixture answers for. `None` answers for any maze.
    #[serde(default)]
    pub name: Option<String>,
    /// Where a solve starts unless the caller says otherwise.
    #[serde(default = "default_entry")]
    pub entry: String,
    /// Requested ids that resolve to another location.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Every location of the maze.
    pub locations: Vec<LocationRecord>,
}

impl MazeFixture {
    /// Parse a fixture from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, MazeError> {
        if bytes.len() > MAX_FIXTURE_SIZE {
            return Err(MazeError::SerializationError(format!(
                "Fixture size {} bytes exceeds maximum {} bytes",
                bytes.len(),
                MAX_FIXTURE_SIZE
            )));
        }
        serde_json::from_slice(bytes).map_err(|e| MazeError::SerializationError(e.to_string()))
    }

    /// Serialize the fixture as pretty JSON.
    pub fn to_json(&self) -> Result<String, MazeError> {
        serde_json::to_string_pretty(self).map_err(|e| MazeError::SerializationError(e.to_string()))
    }

    /// The configured entry as a location id.
    #[must_use]
    pub fn entry_id(&self) -> LocationId {
        LocationId::new(self.entry.as_str())
    }
}

// =============================================================================
// FIXTURE RESOLVER
// =============================================================================

/// In-memory `LocationResolver` serving a fixture.
///
/// Counts every fetch so callers can observe caching behaviour.
#[derive(Debug, Default)]
pub struct FixtureResolver {
    maze: Option<String>,
    records: BTreeMap<String, LocationRecord>,
    aliases: BTreeMap<String, String>,
    fetches: AtomicUsize,
}

impl FixtureResolver {
    /// Build a resolver answering for any maze name.
    #[must_use]
    pub fn from_records(records: Vec<LocationRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..Self::default()
        }
    }

    /// Build a resolver from a parsed fixture.
    pub fn from_fixture(fixture: MazeFixture) -> Result<Self, MazeError> {
        let maze = fixture
            .name
            .as_deref()
            .map(MazeName::parse)
            .transpose()?
            .map(|name| name.as_str().to_string());

        let mut resolver = Self::from_records(fixture.locations);
        resolver.maze = maze;
        resolver.aliases = fixture.aliases;
        Ok(resolver)
    }

    /// Add an alias: fetching `requested` answers with `target`'s record.
    #[must_use]
    pub fn with_alias(mut self, requested: &str, target: &str) -> Self {
        self.aliases
            .insert(requested.to_string(), target.to_string());
        self
    }

    /// Total number of fetches served (including failed ones).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of locations in the fixture.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the fixture has no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LocationResolver for FixtureResolver {
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if self
            .maze
            .as_deref()
            .is_some_and(|expected| expected != maze.as_str())
        {
            return Err(MazeError::LocationUnavailable {
                id: id.clone(),
                reason: format!("maze {maze} is not available"),
            });
        }

        let key = self
            .aliases
            .get(id.as_str())
            .map(String::as_str)
            .unwrap_or(id.as_str());

        self.records
            .get(key)
            .cloned()
            .ok_or_else(|| MazeError::LocationUnavailable {
                id: id.clone(),
                reason: "unknown location".to_string(),
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================
