//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! Random bidirectional mazes are checked against a plain adjacency-list
//! BFS: tree distances, segment symmetry, fetch-once resolution and the
//! optimality of the planner against brute force over waypoint orderings.

use labyrinth_core::{
    FixtureResolver, LazyGraph, LocationId, LocationRecord, LocationRole, MazeError, MazeName,
    RoutePlanner, SegmentResolver, TreeBuilder, build_tree,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// HELPERS
// =============================================================================

fn name(i: usize) -> String {
    format!("n{i}")
}

/// Undirected adjacency lists; self loops and duplicates are dropped.
fn adjacency(n: usize, edges: &[(usize, usize)]) -> Vec<BTreeSet<usize>> {
    let mut adj = vec![BTreeSet::new(); n];
    for &(u, v) in edges {
        if u != v {
            adj[u].insert(v);
            adj[v].insert(u);
        }
    }
    adj
}

/// Reference BFS distances from `source`.
fn reference_distances(adj: &[BTreeSet<usize>], source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; adj.len()];
    dist[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(u) = queue.pop_front() {
        let d = dist[u].unwrap_or_default();
        for &v in &adj[u] {
            if dist[v].is_none() {
                dist[v] = Some(d + 1);
                queue.push_back(v);
            }
        }
    }
    dist
}

fn resolver(adj: &[BTreeSet<usize>], roles: &BTreeMap<usize, LocationRole>) -> FixtureResolver {
    let records = adj
        .iter()
        .enumerate()
        .map(|(i, neighbors)| {
            LocationRecord::new(
                name(i),
                roles.get(&i).copied().unwrap_or(LocationRole::Normal),
                neighbors
                    .iter()
                    .map(|&j| format!("http://maze/Location/prop/{}", name(j)))
                    .collect(),
            )
        })
        .collect();
    FixtureResolver::from_records(records)
}

fn maze() -> MazeName {
    MazeName::parse("prop").expect("name")
}

/// Shortest tour entry -> all waypoints (any order) -> exit, by brute force.
fn brute_force(
    adj: &[BTreeSet<usize>],
    entry: usize,
    waypoints: &[usize],
    exit: usize,
) -> Option<usize> {
    fn permute(
        dist: &BTreeMap<usize, Vec<Option<usize>>>,
        current: usize,
        remaining: &mut Vec<usize>,
        exit: usize,
        so_far: usize,
        best: &mut Option<usize>,
    ) {
        if remaining.is_empty() {
            if let Some(d) = dist[&current][exit] {
                let total = so_far + d;
                if best.is_none_or(|b| total < b) {
                    *best = Some(total);
                }
            }
            return;
        }
        for i in 0..remaining.len() {
            let next = remaining.remove(i);
            if let Some(d) = dist[&current][next] {
                permute(dist, next, remaining, exit, so_far + d, best);
            }
            remaining.insert(i, next);
        }
    }

    let mut dist = BTreeMap::new();
    for &source in std::iter::once(&entry).chain(waypoints) {
        dist.insert(source, reference_distances(adj, source));
    }

    let mut best = None;
    let mut remaining = waypoints.to_vec();
    permute(&dist, entry, &mut remaining, exit, 0, &mut best);
    best
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (3usize..14).prop_flat_map(|n| (Just(n), vec((0..n, 0..n), 0..n * 3)))
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Parent chains have exactly the reference BFS length.
    #[test]
    fn tree_distances_match_reference((n, edges) in graph_strategy(), source in 0usize..14) {
        let source = source % n;
        let adj = adjacency(n, &edges);
        let resolver = resolver(&adj, &BTreeMap::new());
        let mut graph = LazyGraph::new(&resolver, maze());

        let tree = build_tree(&mut graph, &LocationId::new(name(source))).expect("bfs");
        let expected = reference_distances(&adj, source);

        for (i, dist) in expected.iter().enumerate() {
            prop_assert_eq!(tree.distance(&LocationId::new(name(i))), *dist);
        }
    }

    /// Every parent pointer follows a real edge.
    #[test]
    fn parent_pointers_are_edges((n, edges) in graph_strategy()) {
        let adj = adjacency(n, &edges);
        let resolver = resolver(&adj, &BTreeMap::new());
        let mut graph = LazyGraph::new(&resolver, maze());
        let tree = build_tree(&mut graph, &LocationId::new(name(0))).expect("bfs");

        for id in tree.reachable() {
            if let Some(Some(parent)) = tree.parent(id) {
                let location = graph.resolve(parent).expect("cached");
                prop_assert!(location.neighbors.contains(id));
            }
        }
    }

    /// On bidirectional mazes segments have the same length both ways.
    #[test]
    fn segments_are_symmetric((n, edges) in graph_strategy(), a in 0usize..14, b in 0usize..14) {
        let (a, b) = (LocationId::new(name(a % n)), LocationId::new(name(b % n)));
        let adj = adjacency(n, &edges);
        let resolver = resolver(&adj, &BTreeMap::new());
        let mut graph = LazyGraph::new(&resolver, maze());
        let mut trees = TreeBuilder::new();
        let mut segments = SegmentResolver::new();

        let forward = segments.segment(&mut trees, &mut graph, &a, &b);
        let backward = segments.segment(&mut trees, &mut graph, &b, &a);

        match (forward, backward) {
            (Ok(f), Ok(r)) => prop_assert_eq!(f.edges(), r.edges()),
            (Err(MazeError::Unreachable { .. }), Err(MazeError::Unreachable { .. })) => {}
            (f, r) => prop_assert!(false, "asymmetric reachability: {:?} / {:?}", f, r),
        }
    }

    /// Resolving the same id repeatedly fetches it once.
    #[test]
    fn resolve_is_fetch_once((n, edges) in graph_strategy(), repeats in 1usize..5) {
        let adj = adjacency(n, &edges);
        let resolver = resolver(&adj, &BTreeMap::new());
        let mut graph = LazyGraph::new(&resolver, maze());

        for _ in 0..repeats {
            graph.resolve(&LocationId::new(name(n - 1))).expect("resolve");
        }
        prop_assert_eq!(resolver.fetch_count(), 1);
    }

    /// The planner finds the brute-force optimum, and the route is valid.
    #[test]
    fn planner_matches_brute_force(
        (n, edges) in graph_strategy(),
        picks in vec(1usize..14, 0..4)
    ) {
        let adj = adjacency(n, &edges);
        let (entry, exit) = (0, n - 1);
        let waypoints: BTreeSet<usize> = picks
            .into_iter()
            .map(|p| p % n)
            .filter(|&p| p != entry && p != exit)
            .collect();

        let mut roles = BTreeMap::new();
        roles.insert(exit, LocationRole::Exit);
        for &w in &waypoints {
            roles.insert(w, LocationRole::Waypoint);
        }

        let reachable = reference_distances(&adj, entry);
        let reachable_waypoints: Vec<usize> = waypoints
            .iter()
            .copied()
            .filter(|&w| reachable[w].is_some())
            .collect();
        let expected = if reachable[exit].is_some() {
            brute_force(&adj, entry, &reachable_waypoints, exit)
        } else {
            None
        };

        let resolver = resolver(&adj, &roles);
        let mut planner = RoutePlanner::new(&resolver, maze());
        let result = planner.plan(&LocationId::new(name(entry)));

        match (result, expected) {
            (Ok(route), Some(steps)) => {
                prop_assert_eq!(route.steps(), steps);
                prop_assert_eq!(route.entry(), Some(&LocationId::new(name(entry))));
                prop_assert_eq!(route.exit(), Some(&LocationId::new(name(exit))));
                for w in &reachable_waypoints {
                    prop_assert!(route.path.contains(&LocationId::new(name(*w))));
                }
                for pair in route.path.windows(2) {
                    let location = planner.graph().locations().find(|l| l.id == pair[0]);
                    let adjacent = location.is_some_and(|l| l.neighbors.contains(&pair[1]));
                    prop_assert!(adjacent, "{} -> {} is not an edge", pair[0], pair[1]);
                }
            }
            (Err(MazeError::NoSolution), None) => {}
            (result, expected) => {
                prop_assert!(false, "planner {:?} vs brute force {:?}", result, expected);
            }
        }
    }
}
