//! # Waypoint Route Planner
//!
//! Finds the shortest route that starts at the entry, collects every
//! waypoint exactly once in some order, and ends at the exit.
//!
//! ## Algorithm
//!
//! Depth-first branch-and-bound over waypoint orderings:
//! - A branch carries the current location, the waypoints already visited,
//!   the path so far and its length. Branches are passed by value.
//! - When every waypoint is visited the branch is closed with the segment
//!   to the exit and competes for the best route.
//! - Unvisited waypoints are tried nearest first, so the first complete
//!   route is the greedy one and the bound is tight early.
//! - A branch is extended only while its lower bound stays strictly below
//!   the best complete route. The bound is the length so far plus, over the
//!   unvisited waypoints `w`, the largest `d(current, w) + d(w, exit)`.
//! - An unreachable waypoint kills that branch only.
//!
//! There is no cap on the waypoint count; the bound keeps the search small
//! on real mazes, and the worst case stays exponential.
//!
//! Segments and shortest-path trees are memoized, so every
//! `(location, waypoint)` shortest path is computed once per session.
//!
//! ## Ties
//!
//! The first route found with the minimal length wins; later routes must be
//! strictly shorter to replace it. The bound never exceeds the length of any
//! completion of the branch, so pruning on `bound >= best` never discards a
//! strictly shorter route.

use crate::bfs::TreeBuilder;
use crate::graph::LazyGraph;
use crate::resolver::LocationResolver;
use crate::segment::{Segment, SegmentResolver};
use crate::{LocationId, MazeError, MazeName, Route};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counters describing the work a plan took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanStats {
    /// Distinct locations in the cache.
    pub locations_resolved: usize,
    /// Calls made to the resolver.
    pub fetches: usize,
    /// Waypoints discovered.
    pub waypoints: usize,
    /// Shortest-path trees built.
    pub trees_built: usize,
    /// Distinct segments computed.
    pub segments_computed: usize,
    /// Branches extended towards a waypoint.
    pub branches_explored: usize,
    /// Branches cut because they could not beat the best route.
    pub branches_pruned: usize,
}

/// Partial route under construction.
#[derive(Debug, Clone)]
struct Branch {
    current: LocationId,
    visited: BTreeSet<LocationId>,
    path: Vec<LocationId>,
    length: usize,
}

impl Branch {
    fn start(entry: LocationId) -> Self {
        Self {
            current: entry.clone(),
            visited: BTreeSet::new(),
            path: vec![entry],
            length: 0,
        }
    }

    /// Extend the branch along `segment`, whose source is `current`.
    fn extend(&self, segment: &Segment) -> Self {
        let mut path = self.path.clone();
        path.extend(segment.nodes().iter().skip(1).cloned());

        let current = segment
            .target()
            .cloned()
            .unwrap_or_else(|| self.current.clone());
        let mut visited = self.visited.clone();
        visited.insert(current.clone());

        Self {
            current,
            visited,
            path,
            length: self.length.saturating_add(segment.edges()),
        }
    }
}

/// Planner owning all session-scoped state: the lazy graph, the tree memo
/// and the segment memo.
///
/// Dropping the planner discards the session; there is no partial reset.
#[derive(Debug)]
pub struct RoutePlanner<R> {
    graph: LazyGraph<R>,
    trees: TreeBuilder,
    segments: SegmentResolver,
    explored: usize,
    pruned: usize,
}

impl<R: LocationResolver> RoutePlanner<R> {
    /// Create a planner for `maze` with empty caches.
    #[must_use]
    pub fn new(resolver: R, maze: MazeName) -> Self {
        Self {
            graph: LazyGraph::new(resolver, maze),
            trees: TreeBuilder::new(),
            segments: SegmentResolver::new(),
            explored: 0,
            pruned: 0,
        }
    }

    /// Shortest route from `entry` through every waypoint to the exit.
    pub fn plan(&mut self, entry: &LocationId) -> Result<Route, MazeError> {
        let entry = self.graph.resolve(entry)?.id.clone();

        // The entry's tree discovers the whole reachable maze, so the
        // waypoint set and the exit are complete afterwards.
        self.trees.tree(&mut self.graph, &entry)?;

        let exit = self.graph.exit().cloned().ok_or(MazeError::NoSolution)?;
        let waypoints: Vec<LocationId> = self.graph.waypoints().iter().cloned().collect();

        tracing::debug!(
            entry = %entry,
            exit = %exit,
            waypoints = waypoints.len(),
            "planning route"
        );

        let mut best: Option<Route> = None;
        self.explore(Branch::start(entry), &waypoints, &exit, &mut best)?;

        match best {
            Some(route) => {
                tracing::info!(steps = route.steps(), "route found");
                Ok(route)
            }
            None => Err(MazeError::NoSolution),
        }
    }

    fn explore(
        &mut self,
        branch: Branch,
        waypoints: &[LocationId],
        exit: &LocationId,
        best: &mut Option<Route>,
    ) -> Result<(), MazeError> {
        if branch.visited.len() >= waypoints.len() {
            let Some(finale) = self.reachable_segment(&branch.current, exit)? else {
                return Ok(());
            };
            let candidate = branch.extend(&finale);
            if best
                .as_ref()
                .is_none_or(|route| candidate.length < route.steps())
            {
                tracing::trace!(steps = candidate.length, "new best route");
                *best = Some(Route::new(candidate.path));
            }
            return Ok(());
        }

        let mut steps = Vec::new();
        for waypoint in waypoints {
            if branch.visited.contains(waypoint) {
                continue;
            }
            if let Some(segment) = self.reachable_segment(&branch.current, waypoint)? {
                steps.push(segment);
            }
        }
        // Stable: equally near waypoints keep their id order.
        steps.sort_by_key(Segment::edges);

        for segment in steps {
            let next = branch.extend(&segment);
            let Some(bound) = self.lower_bound(&next, waypoints, exit)? else {
                continue;
            };
            if best.as_ref().is_some_and(|route| bound >= route.steps()) {
                self.pruned = self.pruned.saturating_add(1);
                continue;
            }

            self.explored = self.explored.saturating_add(1);
            self.explore(next, waypoints, exit, best)?;
        }

        Ok(())
    }

    /// Shortest length any completion of `branch` can have, or `None` if the
    /// branch cannot be completed.
    fn lower_bound(
        &mut self,
        branch: &Branch,
        waypoints: &[LocationId],
        exit: &LocationId,
    ) -> Result<Option<usize>, MazeError> {
        let mut remaining = None;
        for waypoint in waypoints {
            if branch.visited.contains(waypoint) {
                continue;
            }
            let Some(there) = self.reachable_segment(&branch.current, waypoint)? else {
                return Ok(None);
            };
            let Some(home) = self.reachable_segment(waypoint, exit)? else {
                return Ok(None);
            };
            let detour = there.edges().saturating_add(home.edges());
            remaining = Some(remaining.map_or(detour, |longest: usize| longest.max(detour)));
        }

        let remaining = match remaining {
            Some(remaining) => remaining,
            None => match self.reachable_segment(&branch.current, exit)? {
                Some(finale) => finale.edges(),
                None => return Ok(None),
            },
        };
        Ok(Some(branch.length.saturating_add(remaining)))
    }

    /// A segment, or `None` if its target cannot be reached.
    fn reachable_segment(
        &mut self,
        source: &LocationId,
        target: &LocationId,
    ) -> Result<Option<Segment>, MazeError> {
        match self
            .segments
            .segment(&mut self.trees, &mut self.graph, source, target)
        {
            Ok(segment) => Ok(Some(segment)),
            Err(e) if e.is_recoverable() => {
                tracing::trace!(from = %source, to = %target, "dead branch");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<R> RoutePlanner<R> {
    /// The lazy graph discovered so far.
    #[must_use]
    pub fn graph(&self) -> &LazyGraph<R> {
        &self.graph
    }

    /// Counters for the work done so far.
    #[must_use]
    pub fn stats(&self) -> PlanStats {
        PlanStats {
            locations_resolved: self.graph.location_count(),
            fetches: self.graph.fetch_count(),
            waypoints: self.graph.waypoints().len(),
            trees_built: self.trees.build_count(),
            segments_computed: self.segments.len(),
            branches_explored: self.explored,
            branches_pruned: self.pruned,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationRole;
    use crate::formats::FixtureResolver;
    use crate::resolver::LocationRecord;

    fn record(id: &str, role: LocationRole, exits: &[&str]) -> LocationRecord {
        LocationRecord::new(id, role, exits.iter().map(|s| (*s).to_string()).collect())
    }

    fn maze() -> MazeName {
        MazeName::parse("plan").expect("name")
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.path.iter().map(LocationId::as_str).collect()
    }

    #[test]
    fn no_waypoints_is_direct_path() {
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["a", "b"]),
            record("a", LocationRole::Normal, &["s", "e"]),
            record("b", LocationRole::Normal, &["s"]),
            record("e", LocationRole::Exit, &["a"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(ids(&route), vec!["s", "a", "e"]);
        assert_eq!(route.steps(), 2);
    }

    #[test]
    fn entry_on_exit_is_zero_steps() {
        let resolver = FixtureResolver::from_records(vec![
            record("e", LocationRole::Exit, &["a"]),
            record("a", LocationRole::Normal, &["e"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"e".into()).expect("plan");
        assert_eq!(ids(&route), vec!["e"]);
        assert_eq!(route.steps(), 0);
    }

    #[test]
    fn waypoints_collapse_junctions() {
        // s - w - e
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["w"]),
            record("w", LocationRole::Waypoint, &["s", "e"]),
            record("e", LocationRole::Exit, &["w"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(ids(&route), vec!["s", "w", "e"]);
    }

    #[test]
    fn detour_to_dead_end_waypoint() {
        // s - e, and a waypoint hanging off s: s - w
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["e", "w"]),
            record("w", LocationRole::Waypoint, &["s"]),
            record("e", LocationRole::Exit, &["s"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(ids(&route), vec!["s", "w", "s", "e"]);
        assert_eq!(route.steps(), 3);
    }

    #[test]
    fn missing_exit_is_no_solution() {
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["w"]),
            record("w", LocationRole::Waypoint, &["s"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        assert_eq!(planner.plan(&"s".into()), Err(MazeError::NoSolution));
    }

    #[test]
    fn waypoint_behind_one_way_door_is_no_solution() {
        // s -> w (one way), w is a dead end, so the exit is never reachable
        // after collecting the waypoint.
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["w", "e"]),
            record("w", LocationRole::Waypoint, &[]),
            record("e", LocationRole::Exit, &["s"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        assert_eq!(planner.plan(&"s".into()), Err(MazeError::NoSolution));
    }

    #[test]
    fn unreachable_waypoint_only_kills_its_branch() {
        // w1 leads only to the dead-end exit, so visiting w1 first can never
        // reach w2. The search must fall back to s -> w2 -> w1 -> e.
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["w1", "w2"]),
            record("w1", LocationRole::Waypoint, &["e"]),
            record("w2", LocationRole::Waypoint, &["w1"]),
            record("e", LocationRole::Exit, &[]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(ids(&route), vec!["s", "w2", "w1", "e"]);
        assert_eq!(route.steps(), 3);
    }

    #[test]
    fn plan_is_repeatable_on_warm_caches() {
        let resolver = FixtureResolver::from_records(vec![
            record("s", LocationRole::Normal, &["w"]),
            record("w", LocationRole::Waypoint, &["s", "e"]),
            record("e", LocationRole::Exit, &["w"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let first = planner.plan(&"s".into()).expect("plan");
        let fetches = resolver.fetch_count();
        let trees = planner.stats().trees_built;
        let second = planner.plan(&"s".into()).expect("plan");

        assert_eq!(first, second);
        assert_eq!(resolver.fetch_count(), fetches);
        assert_eq!(planner.stats().trees_built, trees);
    }

    /// `s - w0 - w1 - ... - w{n-1} - e`
    fn pill_line(pills: usize) -> FixtureResolver {
        let name = |i: usize| match i {
            0 => "s".to_string(),
            i if i > pills => "e".to_string(),
            i => format!("w{}", i - 1),
        };
        let records = (0..=pills + 1)
            .map(|i| {
                let role = match i {
                    0 => LocationRole::Normal,
                    i if i > pills => LocationRole::Exit,
                    _ => LocationRole::Waypoint,
                };
                let mut exits = Vec::new();
                if i > 0 {
                    exits.push(name(i - 1));
                }
                if i <= pills {
                    exits.push(name(i + 1));
                }
                LocationRecord::new(name(i), role, exits)
            })
            .collect();
        FixtureResolver::from_records(records)
    }

    #[test]
    fn thirteen_pills_on_a_line() {
        let resolver = pill_line(13);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(route.steps(), 14);
        assert_eq!(route.entry().map(LocationId::as_str), Some("s"));
        assert_eq!(route.exit().map(LocationId::as_str), Some("e"));
        // Greedy order is optimal here; every other first move is bounded out.
        assert_eq!(planner.stats().branches_explored, 13);
    }

    #[test]
    fn many_pills_on_a_line_stay_tractable() {
        let resolver = pill_line(40);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(route.steps(), 41);
        assert_eq!(planner.stats().waypoints, 40);
    }

    #[test]
    fn pills_on_both_sides_of_the_entry() {
        // l2 - l1 - s - r1 - e: the far left pill forces a return through s.
        let resolver = FixtureResolver::from_records(vec![
            record("l2", LocationRole::Waypoint, &["l1"]),
            record("l1", LocationRole::Normal, &["l2", "s"]),
            record("s", LocationRole::Normal, &["l1", "r1"]),
            record("r1", LocationRole::Waypoint, &["s", "e"]),
            record("e", LocationRole::Exit, &["r1"]),
        ]);
        let mut planner = RoutePlanner::new(&resolver, maze());

        let route = planner.plan(&"s".into()).expect("plan");
        assert_eq!(ids(&route), vec!["s", "l1", "l2", "l1", "s", "r1", "e"]);
        assert_eq!(route.steps(), 6);
    }
}
