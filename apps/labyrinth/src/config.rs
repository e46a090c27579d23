//! # Configuration
//!
//! Settings for the resolver, the session and the HTTP server.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults
//! 2. `labyrinth.toml` (or the file given with `--config`)
//! 3. Environment: `LABYRINTH_BASE_URL`, `LABYRINTH_ENTRY`, `LABYRINTH_TIMEOUT_SECS`
//! 4. CLI flags (applied by the command layer)
//!
//! ```toml
//! [resolver]
//! base_url = "http://labyrinth.lbi.co.uk/Maze/Location/"
//! timeout_secs = 30
//!
//! [session]
//! entry = "start"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```

use labyrinth_core::MazeError;
use labyrinth_core::primitives::DEFAULT_ENTRY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "labyrinth.toml";

/// Base URL of the public maze service.
pub const DEFAULT_BASE_URL: &str = "http://labyrinth.lbi.co.uk/Maze/Location/";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// How locations are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix of every location URL: `{base_url}{maze}/{location}/json`.
    pub base_url: String,
    /// Per-request timeout. A stalled request fails the solve with
    /// `LocationUnavailable` instead of hanging it.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("labyrinth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Location a solve starts from.
    pub entry: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY.to_string(),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, MazeError> {
        toml::from_str(text).map_err(|e| MazeError::SerializationError(format!("Config: {}", e)))
    }

    /// Load configuration and apply environment overrides.
    ///
    /// With `path` the file must exist. Without it, `labyrinth.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, MazeError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, MazeError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            MazeError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MazeError::SerializationError(format!(
                "Config size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            MazeError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        tracing::debug!("Loaded config from {:?}", path);
        Self::from_toml_str(&text)
    }

    /// Apply `LABYRINTH_*` overrides using `lookup` to read variables.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LABYRINTH_BASE_URL") {
            self.resolver.base_url = url;
        }
        if let Some(entry) = lookup("LABYRINTH_ENTRY") {
            self.session.entry = entry;
        }
        if let Some(secs) = lookup("LABYRINTH_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.resolver.timeout_secs = secs,
                Err(e) => {
                    tracing::warn!("Ignoring LABYRINTH_TIMEOUT_SECS={:?}: {}", secs, e);
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    #[test]
    fn defaults_point_at_public_service() {
        let config = Config::default();
        assert_eq!(config.resolver.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session.entry, "start");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[server]\nport = 9000\n").expect("parse");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.resolver, ResolverConfig::default());
    }

    #[test]
    fn invalid_toml_is_serialization_error() {
        let result = Config::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(MazeError::SerializationError(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: BTreeMap<&str, &str> = [
            ("LABYRINTH_BASE_URL", "http://localhost:9999/Maze/Location/"),
            ("LABYRINTH_ENTRY", "lobby"),
            ("LABYRINTH_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_from(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.resolver.base_url, "http://localhost:9999/Maze/Location/");
        assert_eq!(config.session.entry, "lobby");
        assert_eq!(config.resolver.timeout_secs, 5);
    }

    #[test]
    fn from_file_reads_sections() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[resolver]\nbase_url = \"http://localhost:7000/\"\n\n[session]\nentry = \"lobby\""
        )
        .expect("write");

        let config = Config::from_file(file.path()).expect("load");
        assert_eq!(config.resolver.base_url, "http://localhost:7000/");
        assert_eq!(config.session.entry, "lobby");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = Config::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(MazeError::IoError(_))));
    }

    #[test]
    fn bad_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_from(|key| (key == "LABYRINTH_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.resolver.timeout_secs, 30);
    }
}
