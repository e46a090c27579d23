//! # Labyrinth
//!
//! Application layer around `labyrinth-core`: configuration, the HTTP
//! location resolver, the CLI and the REST API.

pub mod api;
pub mod cli;
pub mod config;
pub mod resolver;
