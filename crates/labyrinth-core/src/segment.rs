//! # Segment Resolver
//!
//! Point-to-point shortest paths, memoized per `(source, target)` pair.
//!
//! A segment is read off the shortest-path tree rooted at its source, so a
//! source's tree is built once no matter how many targets are asked for.

use crate::bfs::TreeBuilder;
use crate::graph::LazyGraph;
use crate::resolver::LocationResolver;
use crate::{LocationId, MazeError};
use std::collections::BTreeMap;

/// A shortest path between two locations, both endpoints included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    nodes: Vec<LocationId>,
}

impl Segment {
    /// The locations of the segment, source first.
    #[must_use]
    pub fn nodes(&self) -> &[LocationId] {
        &self.nodes
    }

    /// Number of edges in the segment.
    #[must_use]
    pub fn edges(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// First location.
    #[must_use]
    pub fn source(&self) -> Option<&LocationId> {
        self.nodes.first()
    }

    /// Last location.
    #[must_use]
    pub fn target(&self) -> Option<&LocationId> {
        self.nodes.last()
    }
}

/// Session-scoped memo of segments.
///
/// Unreachable pairs are memoized too, so a dead branch is only
/// discovered once.
#[derive(Debug, Default)]
pub struct SegmentResolver {
    segments: BTreeMap<(LocationId, LocationId), Option<Segment>>,
}

impl SegmentResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest path from `source` to `target`.
    ///
    /// Fails with `MazeError::Unreachable` if no path exists. Any error from
    /// resolving the graph is passed through unchanged.
    pub fn segment<R: LocationResolver>(
        &mut self,
        trees: &mut TreeBuilder,
        graph: &mut LazyGraph<R>,
        source: &LocationId,
        target: &LocationId,
    ) -> Result<Segment, MazeError> {
        let key = (source.clone(), target.clone());

        let cached = match self.segments.get(&key) {
            Some(cached) => cached.clone(),
            None => {
                let tree = trees.tree(graph, source)?;
                let segment = tree.path_to(target).map(|nodes| Segment { nodes });
                tracing::trace!(
                    from = %source,
                    to = %target,
                    edges = segment.as_ref().map(Segment::edges),
                    "segment computed"
                );
                self.segments.insert(key, segment.clone());
                segment
            }
        };

        cached.ok_or_else(|| MazeError::Unreachable {
            from: source.clone(),
            to: target.clone(),
        })
    }

    /// Check if a pair has been computed (reachable or not).
    #[must_use]
    pub fn contains(&self, source: &LocationId, target: &LocationId) -> bool {
        self.segments
            .contains_key(&(source.clone(), target.clone()))
    }

    /// Number of distinct pairs computed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if nothing has been computed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
