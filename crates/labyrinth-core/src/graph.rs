//! # Lazy Graph
//!
//! The memoizing view of a maze that is discovered one location at a time.
//!
//! Every location is fetched from the resolver at most once per session.
//! Resolution also records the roles the BFS and planner care about: the
//! set of waypoints and the single exit.
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::resolver::LocationResolver;
use crate::{Location, LocationId, LocationRole, MazeError, MazeName};
use std::collections::{BTreeMap, BTreeSet};

/// Session-scoped cache of resolved locations.
///
/// The cache only grows. A `Location` entry exists for an id if and only if
/// that id has been resolved; an id is never resolved twice.
#[derive(Debug)]
pub struct LazyGraph<R> {
    /// The collaborator that knows the maze.
    resolver: R,
    /// Maze being explored.
    maze: MazeName,
    /// Resolved locations keyed by canonical id.
    locations: BTreeMap<LocationId, Location>,
    /// Requested ids the resolver answered with a different canonical id
    /// (the service maps `start` to the entrance's real id).
    aliases: BTreeMap<LocationId, LocationId>,
    /// Waypoints discovered so far.
    waypoints: BTreeSet<LocationId>,
    /// The exit, once discovered.
    exit: Option<LocationId>,
    /// Number of resolver calls made.
    fetches: usize,
}

impl<R: LocationResolver> LazyGraph<R> {
    /// Create an empty graph for `maze` backed by `resolver`.
    #[must_use]
    pub fn new(resolver: R, maze: MazeName) -> Self {
        Self {
            resolver,
            maze,
            locations: BTreeMap::new(),
            aliases: BTreeMap::new(),
            waypoints: BTreeSet::new(),
            exit: None,
            fetches: 0,
        }
    }

    /// Resolve a location, fetching it on first use.
    ///
    /// Fails with `AmbiguousExit` if the location is an exit and a different
    /// exit was already recorded.
    pub fn resolve(&mut self, id: &LocationId) -> Result<&Location, MazeError> {
        let canonical = match self.canonical_id(id) {
            Some(canonical) => canonical,
            None => self.fetch(id)?,
        };

        self.locations
            .get(&canonical)
            .ok_or_else(|| MazeError::LocationUnavailable {
                id: id.clone(),
                reason: "location vanished from cache".to_string(),
            })
    }

    /// Neighbors of a location, resolving it if needed.
    pub fn neighbors(&mut self, id: &LocationId) -> Result<Vec<LocationId>, MazeError> {
        Ok(self.resolve(id)?.neighbors.clone())
    }

    /// The canonical id for an already resolved id or alias.
    #[must_use]
    pub fn canonical_id(&self, id: &LocationId) -> Option<LocationId> {
        if self.locations.contains_key(id) {
            return Some(id.clone());
        }
        self.aliases.get(id).cloned()
    }

    fn fetch(&mut self, id: &LocationId) -> Result<LocationId, MazeError> {
        if !id.is_valid() {
            return Err(MazeError::LocationUnavailable {
                id: id.clone(),
                reason: "not a valid location id".to_string(),
            });
        }

        tracing::debug!(maze = %self.maze, location = %id, "fetching location");
        self.fetches = self.fetches.saturating_add(1);

        let record = self.resolver.fetch(&self.maze, id)?;
        let location = record.into_location(id)?;
        let canonical = location.id.clone();

        if canonical != *id {
            tracing::trace!(requested = %id, canonical = %canonical, "location alias");
            self.aliases.insert(id.clone(), canonical.clone());
        }

        // The service may answer two different requests with the same location.
        if self.locations.contains_key(&canonical) {
            return Ok(canonical);
        }

        match location.role {
            LocationRole::Waypoint => {
                self.waypoints.insert(canonical.clone());
            }
            LocationRole::Exit => match &self.exit {
                Some(recorded) if *recorded != canonical => {
                    return Err(MazeError::AmbiguousExit {
                        recorded: recorded.clone(),
                        found: canonical,
                    });
                }
                Some(_) => {}
                None => {
                    tracing::debug!(exit = %canonical, "exit discovered");
                    self.exit = Some(canonical.clone());
                }
            },
            LocationRole::Normal => {}
        }

        self.locations.insert(canonical.clone(), location);
        Ok(canonical)
    }
}

impl<R> LazyGraph<R> {
    /// The maze this graph explores.
    #[must_use]
    pub fn maze(&self) -> &MazeName {
        &self.maze
    }

    /// Waypoints discovered so far, in deterministic order.
    #[must_use]
    pub fn waypoints(&self) -> &BTreeSet<LocationId> {
        &self.waypoints
    }

    /// The exit, if discovered.
    #[must_use]
    pub fn exit(&self) -> Option<&LocationId> {
        self.exit.as_ref()
    }

    /// Check if a location has been resolved (by canonical id or alias).
    #[must_use]
    pub fn contains(&self, id: &LocationId) -> bool {
        self.locations.contains_key(id) || self.aliases.contains_key(id)
    }

    /// Number of distinct locations resolved.
    #[must_use]
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of resolver calls made by this graph.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Iterate over resolved locations in deterministic order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }
}

// =============================================================================
// TESTS
// =============================================================================
