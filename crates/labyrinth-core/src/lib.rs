//! # labyrinth-core
//!
//! The maze routing engine for Labyrinth - THE LOGIC.
//!
//! A maze is not known up front: it is discovered one location at a time
//! through a `LocationResolver`. On top of that lazy view this crate finds
//! the shortest route from an entry, through every power pill, to the exit.
//!
//! ## Layers
//!
//! Each layer only calls the one below it:
//!
//! ```text
//! RoutePlanner      (planner)  branch-and-bound over waypoint orderings
//!   SegmentResolver (segment)  memoized point-to-point shortest paths
//!     TreeBuilder   (bfs)      memoized shortest-path trees, one per root
//!       LazyGraph   (graph)    fetch-once location cache
//!         LocationResolver     the outside world
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous and single-threaded; a stalled resolver stalls the solve
//! - No network code: transports implement `LocationResolver` elsewhere
//! - Deterministic containers only (`BTreeMap`/`BTreeSet`)

// =============================================================================
// MODULES
// =============================================================================

pub mod bfs;
pub mod formats;
pub mod graph;
pub mod planner;
pub mod primitives;
pub mod resolver;
pub mod segment;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Location, LocationId, LocationRole, MazeError, MazeName, Route};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use bfs::{ShortestPathTree, TreeBuilder, build_tree};
pub use graph::LazyGraph;
pub use planner::{PlanStats, RoutePlanner};
pub use resolver::{LocationRecord, LocationResolver, location_id_from_reference};
pub use segment::{Segment, SegmentResolver};
pub use session::{FailureReason, MazeSession, Notification, Solution, solve_maze};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{FixtureResolver, MazeFixture};
