//! # Innate Primitives
//!
//! Hardcoded runtime constants and limits for the Labyrinth CORE.
//!
//! These primitives are compiled into the binary and are immutable at runtime.

/// Location a session starts from when the caller does not name one.
pub const DEFAULT_ENTRY: &str = "start";

/// Maximum length of a location identifier, in bytes.
///
/// References whose final path segment exceeds this are rejected as malformed.
pub const MAX_LOCATION_ID_LENGTH: usize = 128;

/// Maximum length of a maze name, in bytes.
pub const MAX_MAZE_NAME_LENGTH: usize = 64;

// =============================================================================
// WIRE NAMES
// =============================================================================

/// `LocationType` value of an ordinary corridor cell.
pub const WIRE_NORMAL: &str = "Normal";

/// `LocationType` value of the maze entrance.
pub const WIRE_START: &str = "Start";

/// `LocationType` value of a mandatory waypoint.
pub const WIRE_POWER_PILL: &str = "PowerPill";

/// `LocationType` value of the maze exit.
pub const WIRE_EXIT: &str = "Exit";
