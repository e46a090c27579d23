//! # Shortest-Path Trees
//!
//! Breadth-first search over the lazy graph.
//!
//! A `ShortestPathTree` maps every location reachable from a root to its
//! predecessor on a shortest path from that root. Every edge has unit
//! weight, so BFS discovery order is shortest-distance order.
//!
//! `TreeBuilder` memoizes one tree per root for the lifetime of a session.

use crate::graph::LazyGraph;
use crate::resolver::LocationResolver;
use crate::{LocationId, MazeError};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

// =============================================================================
// SHORTEST-PATH TREE
// =============================================================================

/// Parent map of a BFS rooted at one location.
///
/// `parents[root]` is `None`; every other key's parent is one edge closer
/// to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPathTree {
    root: LocationId,
    parents: BTreeMap<LocationId, Option<LocationId>>,
}

impl ShortestPathTree {
    /// Check if a location is reachable from the root.
    #[must_use]
    pub fn contains(&self, id: &LocationId) -> bool {
        self.parents.contains_key(id)
    }

    /// Predecessor of `id`: `None` if `id` is not in the tree,
    /// `Some(None)` for the root.
    #[must_use]
    pub fn parent(&self, id: &LocationId) -> Option<Option<&LocationId>> {
        self.parents.get(id).map(Option::as_ref)
    }

    /// Number of reachable locations, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if the tree is empty (never true for a built tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Iterate over reachable locations in deterministic order.
    pub fn reachable(&self) -> impl Iterator<Item = &LocationId> {
        self.parents.keys()
    }

    /// Shortest path from the root to `target`, both inclusive.
    ///
    /// Returns `None` if `target` is not reachable.
    #[must_use]
    pub fn path_to(&self, target: &LocationId) -> Option<Vec<LocationId>> {
        let mut path = Vec::new();
        let mut current = target;
        loop {
            path.push(current.clone());
            match self.parents.get(current)? {
                Some(parent) => current = parent,
                // Only the root has no parent.
                None if *current == self.root => break,
                None => return None,
            }
            // A parent chain longer than the tree means the map is corrupt.
            if path.len() > self.parents.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }

    /// Number of edges between the root and `target`.
    #[must_use]
    pub fn distance(&self, target: &LocationId) -> Option<usize> {
        self.path_to(target).map(|p| p.len().saturating_sub(1))
    }
}

/// Build the shortest-path tree rooted at `source`.
///
/// Level-synchronous BFS: each frontier node's neighbors are resolved and
/// every neighbor not yet in the parent map joins the next frontier.
///
/// Neighbors are keyed by canonical id, so a reference written as an alias
/// (the service's `start`) lands on the same tree node as its location.
pub fn build_tree<R: LocationResolver>(
    graph: &mut LazyGraph<R>,
    source: &LocationId,
) -> Result<ShortestPathTree, MazeError> {
    let root = graph.resolve(source)?.id.clone();

    let mut parents = BTreeMap::new();
    parents.insert(root.clone(), None);
    let mut frontier = vec![root.clone()];

    while !frontier.is_empty() {
        let mut next = Vec::new();

        for node in &frontier {
            for neighbor in graph.neighbors(node)? {
                let neighbor = graph.resolve(&neighbor)?.id.clone();
                if let Entry::Vacant(slot) = parents.entry(neighbor) {
                    next.push(slot.key().clone());
                    slot.insert(Some(node.clone()));
                }
            }
        }

        frontier = next;
    }

    tracing::trace!(root = %root, reachable = parents.len(), "shortest-path tree built");
    Ok(ShortestPathTree { root, parents })
}

// =============================================================================
// MEMOIZING BUILDER
// =============================================================================

/// Session-scoped memo of shortest-path trees, one per root.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    trees: BTreeMap<LocationId, ShortestPathTree>,
    builds: usize,
}

impl TreeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree rooted at `source`, building it on first request.
    pub fn tree<R: LocationResolver>(
        &mut self,
        graph: &mut LazyGraph<R>,
        source: &LocationId,
    ) -> Result<&ShortestPathTree, MazeError> {
        let root = graph.resolve(source)?.id.clone();

        match self.trees.entry(root) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let tree = build_tree(graph, entry.key())?;
                self.builds = self.builds.saturating_add(1);
                Ok(entry.insert(tree))
            }
        }
    }

    /// Check if a tree rooted at `root` is memoized.
    #[must_use]
    pub fn contains(&self, root: &LocationId) -> bool {
        self.trees.contains_key(root)
    }

    /// Number of trees built (each root at most once).
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FixtureResolver;
    use crate::resolver::LocationRecord;
    use crate::{LocationRole, MazeName};

    fn normal(id: &str, exits: &[&str]) -> LocationRecord {
        LocationRecord::new(
            id,
            LocationRole::Normal,
            exits.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    /// a - b - c - d, with a shortcut a - d and an island x.
    fn ring() -> FixtureResolver {
        FixtureResolver::from_records(vec![
            normal("a", &["b", "d"]),
            normal("b", &["a", "c"]),
            normal("c", &["b", "d"]),
            normal("d", &["c", "a"]),
            normal("x", &[]),
        ])
    }

    fn maze() -> MazeName {
        MazeName::parse("ring").expect("name")
    }

    #[test]
    fn tree_covers_reachable_component() {
        let resolver = ring();
        let mut graph = LazyGraph::new(&resolver, maze());
        let tree = build_tree(&mut graph, &"a".into()).expect("bfs");

        assert_eq!(tree.len(), 4);
        assert!(!tree.contains(&"x".into()));
        assert_eq!(tree.parent(&"a".into()), Some(None));
    }

    #[test]
    fn tree_distances_are_shortest() {
        let resolver = ring();
        let mut graph = LazyGraph::new(&resolver, maze());
        let tree = build_tree(&mut graph, &"a".into()).expect("bfs");

        assert_eq!(tree.distance(&"a".into()), Some(0));
        assert_eq!(tree.distance(&"b".into()), Some(1));
        assert_eq!(tree.distance(&"d".into()), Some(1));
        assert_eq!(tree.distance(&"c".into()), Some(2));
        assert_eq!(tree.distance(&"x".into()), None);
    }

    #[test]
    fn path_to_starts_at_root() {
        let resolver = ring();
        let mut graph = LazyGraph::new(&resolver, maze());
        let tree = build_tree(&mut graph, &"b".into()).expect("bfs");

        let path = tree.path_to(&"d".into()).expect("reachable");
        assert_eq!(path.first(), Some(&LocationId::from("b")));
        assert_eq!(path.last(), Some(&LocationId::from("d")));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn builder_memoizes_per_root() {
        let resolver = ring();
        let mut graph = LazyGraph::new(&resolver, maze());
        let mut builder = TreeBuilder::new();

        let first = builder.tree(&mut graph, &"a".into()).expect("bfs").clone();
        let fetches = resolver.fetch_count();
        let second = builder.tree(&mut graph, &"a".into()).expect("bfs").clone();

        assert_eq!(first, second);
        assert_eq!(builder.build_count(), 1);
        assert_eq!(resolver.fetch_count(), fetches);

        builder.tree(&mut graph, &"c".into()).expect("bfs");
        assert_eq!(builder.build_count(), 2);
        // Every location was already cached by the first tree.
        assert_eq!(resolver.fetch_count(), fetches);
    }

    #[test]
    fn alias_reference_joins_its_location() {
        // `a` lists its neighbor by the alias `start` rather than `s`.
        let resolver = FixtureResolver::from_records(vec![
            normal("s", &["a"]),
            normal("a", &["start", "b"]),
            normal("b", &["a"]),
        ])
        .with_alias("start", "s");
        let mut graph = LazyGraph::new(&resolver, maze());
        let tree = build_tree(&mut graph, &"start".into()).expect("bfs");

        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&"start".into()));
        assert_eq!(tree.parent(&"s".into()), Some(None));
        assert_eq!(tree.distance(&"b".into()), Some(2));

        let tree = build_tree(&mut graph, &"b".into()).expect("bfs");
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&"start".into()));
        assert_eq!(
            tree.path_to(&"s".into()),
            Some(vec!["b".into(), "a".into(), "s".into()])
        );
    }

    #[test]
    fn missing_neighbor_aborts_build() {
        let resolver = FixtureResolver::from_records(vec![normal("a", &["ghost"])]);
        let mut graph = LazyGraph::new(&resolver, maze());

        let result = build_tree(&mut graph, &"a".into());
        assert!(matches!(result, Err(MazeError::LocationUnavailable { .. })));
    }
}
