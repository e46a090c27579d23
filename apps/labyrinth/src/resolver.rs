//! # HTTP Location Resolver
//!
//! `LocationResolver` backed by the remote maze service.
//!
//! Each location is one `GET {base_url}{maze}/{location}/json`. The CORE is
//! synchronous, so `fetch` blocks on the tokio runtime it was created in.
//! It must therefore be called from a blocking context (`spawn_blocking`),
//! never from inside an async task.

use crate::config::ResolverConfig;
use labyrinth_core::{LocationId, LocationRecord, LocationResolver, MazeError, MazeName};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Resolver shared between the CLI, the API and the blocking pool.
pub type SharedResolver = Arc<dyn LocationResolver + Send + Sync>;

/// HTTP client for the maze service.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    http: reqwest::Client,
    base_url: String,
    runtime: Handle,
}

impl HttpResolver {
    /// Create a resolver bound to the current tokio runtime.
    pub fn new(config: &ResolverConfig) -> Result<Self, MazeError> {
        let runtime = Handle::try_current()
            .map_err(|e| MazeError::IoError(format!("No tokio runtime: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MazeError::IoError(format!("HTTP client: {}", e)))?;

        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            runtime,
        })
    }

    /// URL of a location.
    #[must_use]
    pub fn location_url(&self, maze: &MazeName, id: &LocationId) -> String {
        format!("{}{}/{}/json", self.base_url, maze, id)
    }

    async fn fetch_async(
        &self,
        maze: &MazeName,
        id: &LocationId,
    ) -> Result<LocationRecord, MazeError> {
        // Ids are spliced into the URL path unescaped.
        if !id.is_valid() {
            return Err(MazeError::LocationUnavailable {
                id: id.clone(),
                reason: "not a valid location id".to_string(),
            });
        }

        let url = self.location_url(maze, id);
        let unavailable = |reason: String| MazeError::LocationUnavailable {
            id: id.clone(),
            reason,
        };

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(format!("GET {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(format!("GET {}: status {}", url, status)));
        }

        resp.json::<LocationRecord>()
            .await
            .map_err(|e| unavailable(format!("decode {}: {}", url, e)))
    }
}

impl LocationResolver for HttpResolver {
    fn fetch(&self, maze: &MazeName, id: &LocationId) -> Result<LocationRecord, MazeError> {
        self.runtime.block_on(self.fetch_async(maze, id))
    }
}

// =============================================================================
// TESTS
// =============================================================================
