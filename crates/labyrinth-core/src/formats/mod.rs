//! # Formats
//!
//! Serialized forms understood by the CORE. File I/O lives in the app layer.

pub mod fixture;

pub use fixture::{FixtureResolver, MAX_FIXTURE_SIZE, MazeFixture};
